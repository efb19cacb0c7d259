//! Command-line argument parsing

use clap::{Parser, Subcommand};
use report_remote_device::{FtpSecure, Protocol};
use std::path::PathBuf;

/// Manage and exercise remote output devices
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Settings file stem (remote-device.toml by default)
    #[arg(short, long)]
    pub settings: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a device file
    Create {
        file: PathBuf,

        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Defaults to the protocol's usual port
        #[arg(long)]
        port: Option<u16>,

        #[arg(long, default_value = "ftp")]
        protocol: Protocol,

        #[arg(long, default_value = "none")]
        ftp_secure: FtpSecure,

        #[arg(long, default_value = "")]
        user: String,

        #[arg(long, default_value = "")]
        password: String,

        /// Allowed remote directories, separated by ';'
        #[arg(long)]
        directories: Option<String>,
    },

    /// Check a device file
    Validate { file: PathBuf },

    /// Open and close a session with the device
    Test { file: PathBuf },

    /// Upload a result file through the device
    Upload {
        file: PathBuf,

        result: PathBuf,

        /// Remote folder
        #[arg(long, default_value = "")]
        folder: String,

        #[arg(long, default_value = "false")]
        zip: bool,

        #[arg(long)]
        zip_password: Option<String>,
    },
}
