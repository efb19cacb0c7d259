//! Persisted device record
//!
//! The XML document written to a device file. Runtime state (session,
//! messages, backing path) lives on [`RemoteOutputDevice`](super::RemoteOutputDevice)
//! and is never written.

use std::borrow::Cow;
use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Deserialize;

use crate::device::types::{FtpSecure, Protocol};
use crate::error::DeviceError;

const ROOT_ELEMENT: &str = "OutputRemoteDevice";

pub const DEFAULT_DEVICE_NAME: &str = "File Server Device";
pub const DEFAULT_HOST_NAME: &str = "127.0.0.1";
pub const DEFAULT_DIRECTORIES: &str = "/";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename = "OutputRemoteDevice", rename_all = "PascalCase", default)]
pub struct DeviceConfig {
    #[serde(rename = "GUID")]
    pub guid: String,
    pub name: String,
    pub protocol: Protocol,
    pub ftp_secure: FtpSecure,
    pub host_name: String,
    pub port_number: u16,
    /// Allowed remote directories, one per line
    pub directories: String,
    pub user_name: String,
    /// Encrypted password
    pub password: String,
    pub session_hook: String,
    pub upload_hook: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            guid: String::new(),
            name: DEFAULT_DEVICE_NAME.to_string(),
            protocol: Protocol::Ftp,
            ftp_secure: FtpSecure::None,
            host_name: DEFAULT_HOST_NAME.to_string(),
            port_number: Protocol::Ftp.default_port(),
            directories: DEFAULT_DIRECTORIES.to_string(),
            user_name: String::new(),
            password: String::new(),
            session_hook: String::new(),
            upload_hook: String::new(),
        }
    }
}

impl DeviceConfig {
    /// Writes the record as an indented XML document.
    ///
    /// Leading and trailing whitespace of every value is written as
    /// character references so it survives [`from_xml`](Self::from_xml).
    pub fn to_xml(&self) -> Result<String, DeviceError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(serialization)?;
        writer
            .write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))
            .map_err(serialization)?;

        let protocol = self.protocol.to_string();
        let ftp_secure = self.ftp_secure.to_string();
        let port_number = self.port_number.to_string();
        let elements = [
            ("GUID", self.guid.as_str(), true),
            ("Name", self.name.as_str(), true),
            ("Protocol", protocol.as_str(), true),
            ("FtpSecure", ftp_secure.as_str(), true),
            ("HostName", self.host_name.as_str(), true),
            ("PortNumber", port_number.as_str(), true),
            ("Directories", self.directories.as_str(), true),
            ("UserName", self.user_name.as_str(), false),
            ("Password", self.password.as_str(), false),
            ("SessionHook", self.session_hook.as_str(), false),
            ("UploadHook", self.upload_hook.as_str(), false),
        ];
        for (name, value, always) in elements {
            if !always && value.is_empty() {
                continue;
            }
            writer
                .create_element(name)
                .write_text_content(BytesText::from_escaped(entitize(value)))
                .map_err(serialization)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))
            .map_err(serialization)?;

        let mut xml = String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| DeviceError::Serialization(e.to_string()))?;
        xml.push('\n');
        Ok(xml)
    }

    pub fn from_xml(xml: &str) -> Result<Self, DeviceError> {
        quick_xml::de::from_str(xml).map_err(|e| DeviceError::Serialization(e.to_string()))
    }
}

fn serialization(e: quick_xml::Error) -> DeviceError {
    DeviceError::Serialization(e.to_string())
}

/// Escapes markup and turns edge whitespace into character references.
/// The reader trims raw text before resolving references.
fn entitize(value: &str) -> Cow<'_, str> {
    let is_edge = |c: char| matches!(c, ' ' | '\t' | '\n' | '\r');
    let core = value.trim_matches(is_edge);
    if core.len() == value.len() {
        return escape(value);
    }

    let start = value.len() - value.trim_start_matches(is_edge).len();
    let (leading, rest) = value.split_at(start);
    let trailing = &rest[core.len()..];

    let mut out = String::with_capacity(value.len() + 8);
    push_char_refs(&mut out, leading);
    out.push_str(&escape(core));
    push_char_refs(&mut out, trailing);
    Cow::Owned(out)
}

fn push_char_refs(out: &mut String, whitespace: &str) {
    for c in whitespace.chars() {
        out.push_str(&format!("&#{};", c as u32));
    }
}
