//! Device hooks
//!
//! Hooks customise how a device opens its session and what it does with a
//! report. Both are small line-oriented bodies stored with the device; an
//! empty body means the built-in default.

pub mod session;
pub mod template;
pub mod upload;

pub use session::{DEFAULT_SESSION_HOOK, parse_session_hook};
pub use template::render;
pub use upload::{DEFAULT_UPLOAD_HOOK, UploadStep, parse_upload_hook};
