//! Local file storage
//!
//! Handles device file persistence and result archiving on the local disk.

pub mod archive;
pub mod filesystem;

pub use archive::{create_zip, unique_file_name};
pub use filesystem::{file_exists, file_stem, modified_time, write_atomic};
