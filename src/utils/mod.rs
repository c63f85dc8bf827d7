//! Shared helpers: path handling and MIME detection.

pub mod mime;
pub mod path;
