//! Store - Document persistence boundary and editor settings
//!
//! This crate turns a document into the HTML and JSON tree pair the host
//! persists, reads it back, writes the versioned file format and keeps the
//! editor settings file.

mod error;
mod file_io;
mod format;
mod serializer;
mod settings;
mod sink;

pub use error::*;
pub use file_io::*;
pub use format::*;
pub use serializer::*;
pub use settings::*;
pub use sink::*;
