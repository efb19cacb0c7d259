//! remote-device - Entry Point
//!
//! Creates, checks and drives remote output device files from the shell.

mod args;

use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use args::{Args, Command};
use report_remote_device::error::handlers::handle_error;
use report_remote_device::{DeviceError, DeviceSettings, RemoteOutputDevice, Report, ReportOutput};

fn load_device(
    file: &std::path::Path,
    settings: &DeviceSettings,
) -> Result<RemoteOutputDevice, DeviceError> {
    RemoteOutputDevice::load_from_file_with(file, false, settings)?.ok_or_else(|| {
        DeviceError::ReadFailed {
            path: file.to_path_buf(),
            reason: "no device in file".into(),
        }
    })
}

async fn run(command: Command, settings: &DeviceSettings) -> Result<(), DeviceError> {
    match command {
        Command::Create {
            file,
            host,
            port,
            protocol,
            ftp_secure,
            user,
            password,
            directories,
        } => {
            let mut device = RemoteOutputDevice::create().with_settings(settings);
            device.config.host_name = host;
            device.config.protocol = protocol;
            device.config.port_number = port.unwrap_or_else(|| protocol.default_port());
            device.config.ftp_secure = ftp_secure;
            device.config.user_name = user;
            if let Some(directories) = directories {
                device.config.directories = directories;
            }
            device.set_clear_password(&password);
            device.validate()?;
            device.save_to_file(&file)?;
            println!("Created {} ({})", file.display(), device.full_name());
        }
        Command::Validate { file } => {
            let device = load_device(&file, settings)?;
            device.validate()?;
            println!("{} is valid", device.full_name());
        }
        Command::Test { file } => {
            let mut device = load_device(&file, settings)?;
            device.test_connection().await;
            println!("{}", device.information);
            if !device.error.is_empty() {
                return Err(DeviceError::ConnectionTest(device.error));
            }
        }
        Command::Upload {
            file,
            result,
            folder,
            zip,
            zip_password,
        } => {
            let mut device = load_device(&file, settings)?;
            device.validate()?;
            let mut report = Report::new(
                result,
                ReportOutput {
                    folder,
                    zip_result: zip,
                    zip_password,
                    ..Default::default()
                },
            );
            let outcome = device.process(&mut report).await?;
            println!("{}", report.output.information);
            info!("Uploaded {} to {:?}", outcome.local_path.display(), outcome.remote_paths);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let args = Args::parse();
    let settings = match &args.settings {
        Some(stem) => DeviceSettings::load_from(stem),
        None => DeviceSettings::load(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(args.command, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            handle_error(&e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
