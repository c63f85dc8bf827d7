//! Error types for the collection pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by collection, rule processing, the manifest store
/// and the file access adapter.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error on `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A requested file (or the manifest) does not exist.
    ///
    /// Directory opens with listing disabled are reported the same way.
    #[error("`{path}` not found")]
    NotFound { path: PathBuf },

    #[error("manifest version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("malformed manifest `{path}`")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid ignore pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("rule `{rule}` failed on `{path}`")]
    Rule {
        rule: String,
        path: String,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    /// Wrap an IO error, mapping `NotFound` to [`Error::NotFound`].
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Attach a path to `io::Result`s.
pub trait IoResultExt<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| Error::io(path, e))
    }
}
