//! Manifest persistence: original relative path → fingerprinted relative path.
//!
//! Stored as `staticfiles.json` inside the output root:
//!
//! ```json
//! { "paths": { "css/style.css": "css/style.98718311206c.css" }, "version": 1 }
//! ```
//!
//! The version must match [`MANIFEST_VERSION`] exactly; there is no migration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::asset::{FileMap, TrackedFile};
use crate::error::{Error, IoResultExt, Result};

/// Manifest file name inside the output root
pub const MANIFEST_FILE: &str = "staticfiles.json";

/// Schema version written and accepted by this build
pub const MANIFEST_VERSION: u32 = 1;

/// On-disk manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Original relative path → output relative path (sorted for stable output)
    #[serde(default)]
    pub paths: BTreeMap<String, String>,
    pub version: u32,
}

impl Manifest {
    /// Project a file map onto the persisted shape.
    pub fn from_files(files: &FileMap) -> Self {
        Self {
            paths: files
                .projection()
                .map(|(rel, out)| (rel.to_string(), out.to_string()))
                .collect(),
            version: MANIFEST_VERSION,
        }
    }

    /// Restore a file map; absolute paths are not reconstructed.
    pub fn into_files(self) -> FileMap {
        self.paths
            .into_iter()
            .map(|(rel, out)| TrackedFile::restored(rel, out))
            .collect()
    }
}

/// Path of the manifest inside `output_root`.
pub fn manifest_path(output_root: &Path) -> PathBuf {
    output_root.join(MANIFEST_FILE)
}

/// Write the manifest for `files`, replacing any previous one.
///
/// The document is written to a temporary file and renamed into place,
/// so readers never observe a partially written manifest.
pub fn save(output_root: &Path, files: &FileMap) -> Result<()> {
    let path = manifest_path(output_root);
    let tmp = output_root.join(format!(".{MANIFEST_FILE}.tmp"));

    let data = serde_json::to_vec_pretty(&Manifest::from_files(files)).map_err(|source| {
        Error::Manifest {
            path: path.clone(),
            source,
        }
    })?;

    fs::write(&tmp, data).at(&tmp)?;
    fs::rename(&tmp, &path).at(&path)
}

/// Read the manifest in `output_root`.
///
/// Fails with [`Error::NotFound`] when there is none and with
/// [`Error::VersionMismatch`] when it was written by another schema version.
pub fn load(output_root: &Path) -> Result<FileMap> {
    let path = manifest_path(output_root);
    let data = fs::read(&path).at(&path)?;

    let manifest: Manifest =
        serde_json::from_slice(&data).map_err(|source| Error::Manifest { path, source })?;

    if manifest.version != MANIFEST_VERSION {
        return Err(Error::VersionMismatch {
            found: manifest.version,
            expected: MANIFEST_VERSION,
        });
    }

    Ok(manifest.into_files())
}
