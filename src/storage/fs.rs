//! Read-only file access over the collected tree.
//!
//! Requests are served from the output root, or, in passthrough mode,
//! from the input roots in order. With listing disabled a directory open
//! fails exactly like a missing file.

use std::fs::{self, File, Metadata};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::debug;
use crate::error::{Error, IoResultExt, Result};
use crate::utils::path::clean_request_path;

/// File access adapter for a file-serving boundary (e.g. an HTTP handler).
#[derive(Debug, Clone)]
pub struct AssetFs {
    output_root: PathBuf,
    input_roots: Vec<PathBuf>,
    enabled: bool,
    allow_listing: bool,
}

impl AssetFs {
    pub fn new(
        output_root: PathBuf,
        input_roots: Vec<PathBuf>,
        enabled: bool,
        allow_listing: bool,
    ) -> Self {
        Self {
            output_root,
            input_roots,
            enabled,
            allow_listing,
        }
    }

    /// Single-root file system, optionally refusing directory opens.
    pub fn dir(root: impl Into<PathBuf>, allow_listing: bool) -> Self {
        Self::new(root.into(), Vec::new(), true, allow_listing)
    }

    pub fn open(&self, path: &str) -> Result<OpenFile> {
        open_request(
            &self.output_root,
            &self.input_roots,
            self.enabled,
            self.allow_listing,
            path,
        )
    }
}

/// Open `path` against the output root (`enabled`) or the input roots.
pub(super) fn open_request(
    output_root: &Path,
    input_roots: &[PathBuf],
    enabled: bool,
    allow_listing: bool,
    path: &str,
) -> Result<OpenFile> {
    let rel = clean_request_path(path);

    let file = if enabled {
        OpenFile::open(&output_root.join(&rel))?
    } else {
        debug!("serve"; "storage disabled, serving '{}' from input directories", rel);
        open_passthrough(input_roots, &rel)?
    };

    if !allow_listing && file.is_dir() {
        return Err(Error::NotFound { path: rel.into() });
    }
    Ok(file)
}

/// First input root that has the file wins; any error other than
/// not-found stops the search.
fn open_passthrough(input_roots: &[PathBuf], rel: &str) -> Result<OpenFile> {
    let mut last = Error::NotFound { path: rel.into() };

    for root in input_roots {
        match OpenFile::open(&root.join(rel)) {
            Ok(file) => return Ok(file),
            Err(e) if e.is_not_found() => last = e,
            Err(e) => return Err(e),
        }
    }

    Err(last)
}

/// An opened file or directory.
#[derive(Debug)]
pub struct OpenFile {
    path: PathBuf,
    metadata: Metadata,
    /// `None` for directories
    file: Option<File>,
}

impl OpenFile {
    fn open(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).at(path)?;
        let file = if metadata.is_dir() {
            None
        } else {
            Some(File::open(path).at(path)?)
        };

        Ok(Self {
            path: path.to_path_buf(),
            metadata,
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    pub fn len(&self) -> u64 {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry names of a directory, sorted, subdirectories suffixed with `/`.
    pub fn read_dir(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.path).at(&self.path)? {
            let entry = entry.at(&self.path)?;
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().at(entry.path())?.is_dir() {
                name.push('/');
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }
}

impl Read for OpenFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.file {
            Some(file) => file.read(buf),
            None => Err(io::Error::other(format!(
                "`{}` is a directory",
                self.path.display()
            ))),
        }
    }
}
