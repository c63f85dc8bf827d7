//! Path utilities.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `clean`, `to_slash`)
//! - [`request`]: Request path cleaning for the file access adapter

pub mod fs;
pub mod request;

pub use fs::{clean, normalize_path, to_slash};
pub use request::clean_request_path;
