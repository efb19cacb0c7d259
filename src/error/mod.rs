//! Error handling
//!
//! Defines error types and handling for the output device.

pub mod handlers;
pub mod types;

pub use types::*;
