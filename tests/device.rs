use std::fs;
use std::time::{Duration, SystemTime};

use filetime::{FileTime, set_file_mtime};
use report_remote_device::{
    DeviceError, DeviceSettings, FtpSecure, Protocol, RemoteOutputDevice,
};

fn configured_device() -> RemoteOutputDevice {
    let mut device = RemoteOutputDevice::create();
    device.config.protocol = Protocol::Ftp;
    device.config.ftp_secure = FtpSecure::Explicit;
    device.config.host_name = "files.example.com".into();
    device.config.port_number = 2121;
    device.config.user_name = "report".into();
    device.config.directories = "/reports\n/archive".into();
    device.config.session_hook = "timeout_secs = 10\naccept_any_tls_certificate = true".into();
    device.config.upload_hook = "zip\nput {folder}{file_name}".into();
    device.set_clear_password("p@ss <word>");
    device
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Production FTP.scfx");

    let mut device = configured_device();
    device.save_to_file(&path).unwrap();

    let mut loaded = RemoteOutputDevice::load_from_file(&path, false)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.config, device.config);
    assert_eq!(loaded.config.name, "Production FTP");
    assert_eq!(loaded.file_path.as_deref(), Some(path.as_path()));
    assert_eq!(loaded.last_modification, device.last_modification);
    assert_eq!(loaded.clear_password(), "p@ss <word>");
    assert_eq!(loaded.directories_array(), vec!["/reports", "/archive"]);
}

#[test]
fn test_padded_values_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("padded.scfx");

    let mut device = configured_device();
    device.config.user_name = " admin ".into();
    device.config.session_hook = "  # indented\nhost_name = x\n".into();
    device.save_to_file(&path).unwrap();

    let loaded = RemoteOutputDevice::load_from_file(&path, false)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.config.user_name, " admin ");
    assert_eq!(loaded.config.session_hook, "  # indented\nhost_name = x\n");
    assert_eq!(loaded.config, device.config);
}

#[test]
fn test_password_is_not_stored_in_clear() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device.scfx");

    let mut device = configured_device();
    device.save_to_file(&path).unwrap();

    let xml = fs::read_to_string(&path).unwrap();
    assert!(xml.contains("<Password>"));
    assert!(!xml.contains("p@ss"));
}

#[test]
fn test_external_touch_makes_save_fail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device.scfx");

    let mut device = configured_device();
    device.save_to_file(&path).unwrap();
    device.save_to_file(&path).unwrap();

    let earlier = SystemTime::now() - Duration::from_secs(3600);
    set_file_mtime(&path, FileTime::from_system_time(earlier)).unwrap();

    let err = device.save_to_file(&path).unwrap_err();
    assert!(matches!(err, DeviceError::Conflict(_)));
    assert!(
        err.to_string()
            .contains("The file has been modified by another user.")
    );

    let mut reloaded = RemoteOutputDevice::load_from_file(&path, false)
        .unwrap()
        .unwrap();
    reloaded.config.port_number = 21;
    reloaded.save().unwrap();
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.scfx");

    assert!(
        RemoteOutputDevice::load_from_file(&path, true)
            .unwrap()
            .is_none()
    );

    let err = RemoteOutputDevice::load_from_file(&path, false).unwrap_err();
    assert!(matches!(err, DeviceError::ReadFailed { .. }));
    assert!(
        err.to_string()
            .starts_with(&format!("Unable to read the file '{}'", path.display()))
    );
}

#[test]
fn test_corrupted_password_sets_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device.scfx");
    fs::write(
        &path,
        "<?xml version=\"1.0\"?>\n<OutputRemoteDevice>\n  <HostName>ftp.local</HostName>\n  <Password>AAAA</Password>\n</OutputRemoteDevice>\n",
    )
    .unwrap();

    let mut device = RemoteOutputDevice::load_from_file(&path, false)
        .unwrap()
        .unwrap();
    assert_eq!(device.clear_password(), "AAAA");
    assert!(!device.error.is_empty());
    assert!(device.validate().is_ok());
}

#[test]
fn test_password_needs_the_same_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device.scfx");

    let settings = DeviceSettings {
        password_key: "first key".into(),
        ..Default::default()
    };
    let mut device = RemoteOutputDevice::create().with_settings(&settings);
    device.set_clear_password("secret");
    device.save_to_file(&path).unwrap();

    let mut same = RemoteOutputDevice::load_from_file_with(&path, false, &settings)
        .unwrap()
        .unwrap();
    assert_eq!(same.clear_password(), "secret");

    let other = DeviceSettings {
        password_key: "second key".into(),
        ..Default::default()
    };
    let mut different = RemoteOutputDevice::load_from_file_with(&path, false, &other)
        .unwrap()
        .unwrap();
    assert_ne!(different.clear_password(), "secret");
    assert!(!different.error.is_empty());
}

#[test]
fn test_create_validate() {
    let mut device = RemoteOutputDevice::create();
    assert!(device.validate().is_ok());

    device.config.host_name = " ".into();
    assert!(device.validate().is_ok());

    device.config.host_name = String::new();
    assert_eq!(
        device.validate().unwrap_err().to_string(),
        "The File Server cannot be empty."
    );
}
