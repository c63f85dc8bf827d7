//! Content digests and fingerprinted file names.
//!
//! A file `css/style.css` whose content hashes to `98718311206c…` is renamed
//! to `css/style.98718311206c.css`. Identical bytes always produce the same
//! digest segment, whatever the path.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt, Result};

/// Number of hex characters embedded in fingerprinted names.
pub const DIGEST_LEN: usize = 12;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Truncated hex form used as the file name segment.
    pub fn digest(self) -> String {
        hex::encode(&self.0[..DIGEST_LEN / 2])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest())
    }
}

/// Hash the full content of a file.
pub fn hash_file(path: &Path) -> Result<ContentHash> {
    let file = File::open(path).at(path)?;
    hash_reader(BufReader::with_capacity(64 * 1024, file)).at(path)
}

/// Hash everything a reader yields (streaming, for large files).
pub fn hash_reader(mut reader: impl Read) -> io::Result<ContentHash> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(ContentHash::new(*hasher.finalize().as_bytes()))
}

/// Insert `digest` before the extension of `path`'s file name.
///
/// `a/b.css` → `a/b.<digest>.css`; `LICENSE` → `LICENSE.<digest>`.
pub fn with_digest(path: &Path, digest: &str) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default();

    let mut name = stem.to_os_string();
    name.push(".");
    name.push(digest);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }

    path.with_file_name(name)
}

/// Compute the fingerprinted path of a file from its content.
pub fn renamed_path(path: &Path) -> Result<PathBuf> {
    let hash = hash_file(path)?;
    Ok(with_digest(path, &hash.digest()))
}
