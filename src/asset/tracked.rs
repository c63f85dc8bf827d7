//! Tracked file: original path → fingerprinted output mapping.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

/// One collected file.
///
/// `rel_path` is the stable lookup key; `output_rel_path` is what
/// consumers receive when resolving a reference. Entries loaded from a
/// manifest carry only the two relative paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    /// Original file path (absolute), `None` when loaded from a manifest
    pub source: Option<PathBuf>,
    /// Original path relative to its input root, `/`-separated
    pub rel_path: String,
    /// Fingerprinted copy inside the output root (absolute)
    pub output: Option<PathBuf>,
    /// `output` relative to the output root, `/`-separated
    pub output_rel_path: String,
}

impl TrackedFile {
    /// Entry produced by a collection run.
    pub fn collected(
        source: PathBuf,
        rel_path: String,
        output: PathBuf,
        output_rel_path: String,
    ) -> Self {
        Self {
            source: Some(source),
            rel_path,
            output: Some(output),
            output_rel_path,
        }
    }

    /// Entry restored from a manifest record.
    pub fn restored(rel_path: String, output_rel_path: String) -> Self {
        Self {
            source: None,
            rel_path,
            output: None,
            output_rel_path,
        }
    }

    /// Extension of the original file name, if any.
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.rel_path).extension()?.to_str()
    }

    /// File name of the fingerprinted copy.
    pub fn output_file_name(&self) -> &str {
        self.output_rel_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.output_rel_path)
    }
}

/// Original relative path → tracked file.
///
/// Iteration order is unspecified; lookups are by exact key.
#[derive(Debug, Clone, Default)]
pub struct FileMap {
    files: FxHashMap<String, TrackedFile>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry under `file.rel_path`.
    ///
    /// A later input root silently replaces an earlier entry with the
    /// same relative path.
    pub fn insert(&mut self, file: TrackedFile) -> Option<TrackedFile> {
        self.files.insert(file.rel_path.clone(), file)
    }

    pub fn get(&self, rel_path: &str) -> Option<&TrackedFile> {
        self.files.get(rel_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedFile> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// `(rel_path, output_rel_path)` projection, as persisted in the manifest.
    pub fn projection(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files
            .values()
            .map(|f| (f.rel_path.as_str(), f.output_rel_path.as_str()))
    }
}

impl FromIterator<TrackedFile> for FileMap {
    fn from_iter<I: IntoIterator<Item = TrackedFile>>(iter: I) -> Self {
        let mut map = Self::new();
        for file in iter {
            map.insert(file);
        }
        map
    }
}
