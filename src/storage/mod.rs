//! Static file storage: collection, post-processing, manifest and serving.
//!
//! # Pipeline
//!
//! ```text
//! input roots ──collect──▶ file map ──rules──▶ rewritten copies ──save──▶ staticfiles.json
//! ```
//!
//! Each step only starts once the previous one has finished for every file.
//! A failed run leaves the in-memory map and the previous manifest untouched.

mod fs;

pub use fs::{AssetFs, OpenFile};

use std::path::{Path, PathBuf};

use crate::asset::{self, FileMap, IgnoreSet};
use crate::error::{IoResultExt, Result};
use crate::manifest;
use crate::rule::{self, Rule};
use crate::utils::path::normalize_path;

/// Outcome of [`Storage::collect_static`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectSummary {
    /// Files in the resulting map
    pub files: usize,
    /// Files whose fingerprinted copy had to be written
    pub copied: usize,
}

/// Asset storage rooted at an output directory.
pub struct Storage {
    output_root: PathBuf,
    input_roots: Vec<PathBuf>,
    ignore: IgnoreSet,
    rules: Vec<Box<dyn Rule>>,
    files: FileMap,
    /// Serve from the output root; `false` passes through to the input roots
    pub enabled: bool,
    /// Allow opening directories (for index renderers)
    pub allow_listing: bool,
}

impl Storage {
    /// Create a storage and load the manifest already present in `output_root`.
    ///
    /// A missing manifest yields an empty map; a malformed or incompatible
    /// one is an error.
    pub fn new(output_root: impl AsRef<Path>) -> Result<Self> {
        let mut storage = Self::empty(output_root);
        match manifest::load(&storage.output_root) {
            Ok(files) => storage.files = files,
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        Ok(storage)
    }

    /// Create a storage without reading any existing manifest.
    ///
    /// For callers about to run [`Storage::collect_static`], which rebuilds
    /// the map and overwrites a stale or incompatible manifest.
    pub fn empty(output_root: impl AsRef<Path>) -> Self {
        Self {
            output_root: normalize_path(output_root.as_ref()),
            input_roots: Vec::new(),
            ignore: IgnoreSet::new(),
            rules: Vec::new(),
            files: FileMap::new(),
            enabled: true,
            allow_listing: true,
        }
    }

    pub fn add_input_dir(&mut self, path: impl AsRef<Path>) {
        self.input_roots.push(normalize_path(path.as_ref()));
    }

    pub fn add_ignore_pattern(&mut self, pattern: &str) -> Result<()> {
        self.ignore.add(pattern)
    }

    /// Append a rule; rules run in registration order.
    pub fn register_rule(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn register_rules(&mut self, rules: impl IntoIterator<Item = Box<dyn Rule>>) {
        self.rules.extend(rules);
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn files(&self) -> &FileMap {
        &self.files
    }

    /// Collect input roots into the output root, apply rules and write
    /// the manifest.
    pub fn collect_static(&mut self) -> Result<CollectSummary> {
        std::fs::create_dir_all(&self.output_root).at(&self.output_root)?;
        self.output_root = normalize_path(&self.output_root);

        let collected = asset::collect(&self.input_roots, &self.output_root, &self.ignore)?;
        rule::run_rules(&collected.files, &self.rules)?;
        manifest::save(&self.output_root, &collected.files)?;

        let summary = CollectSummary {
            files: collected.files.len(),
            copied: collected.copied,
        };
        self.files = collected.files;
        Ok(summary)
    }

    /// Output-relative path for an original relative path.
    ///
    /// Returns an empty string for unknown paths. When storage is disabled
    /// the path is returned unchanged.
    pub fn resolve(&self, rel_path: &str) -> String {
        if !self.enabled {
            return rel_path.to_string();
        }
        self.files
            .get(rel_path)
            .map(|f| f.output_rel_path.clone())
            .unwrap_or_default()
    }

    /// Open a request path through the file access adapter.
    pub fn open(&self, path: &str) -> Result<OpenFile> {
        fs::open_request(
            &self.output_root,
            &self.input_roots,
            self.enabled,
            self.allow_listing,
            path,
        )
    }

    /// Detached adapter with the current roots and toggles.
    pub fn file_system(&self) -> AssetFs {
        AssetFs::new(
            self.output_root.clone(),
            self.input_roots.clone(),
            self.enabled,
            self.allow_listing,
        )
    }
}
