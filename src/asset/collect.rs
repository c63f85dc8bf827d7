//! Collection: walk input roots, copy files under fingerprinted names.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::debug;
use crate::error::{Error, IoResultExt, Result};
use crate::utils::path::to_slash;

use super::digest;
use super::{FileMap, IgnoreSet, TrackedFile};

/// Result of a collection run.
#[derive(Debug, Default)]
pub struct Collected {
    pub files: FileMap,
    /// Files whose bytes were actually copied (fingerprinted copy was missing)
    pub copied: usize,
}

/// Collect every regular file under `input_roots` into `output_root`.
///
/// Roots are walked depth-first in order; a later root replaces entries of
/// an earlier one with the same relative path. A fingerprinted copy that
/// already exists is not copied again. Stale copies from earlier runs are
/// left in place.
///
/// The first IO error aborts the run; the partial map is discarded.
pub fn collect(
    input_roots: &[PathBuf],
    output_root: &Path,
    ignore: &IgnoreSet,
) -> Result<Collected> {
    let mut collected = Collected::default();

    for root in input_roots {
        collect_root(root, output_root, ignore, &mut collected)?;
    }

    Ok(collected)
}

fn collect_root(
    root: &Path,
    output_root: &Path,
    ignore: &IgnoreSet,
    collected: &mut Collected,
) -> Result<()> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            // Never re-collect our own output when it lives under an input root
            if entry.path() == output_root {
                return false;
            }
            ignore.is_empty() || !ignore.is_ignored(&relative_slash(root, entry.path()))
        });

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            Error::io(path, io::Error::from(e))
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        let (file, copied) = collect_file(root, entry.path(), output_root)?;
        if copied {
            collected.copied += 1;
        }
        collected.files.insert(file);
    }

    Ok(())
}

/// Fingerprint one file and make sure its copy exists in the output root.
///
/// Returns the tracked entry and whether bytes were copied.
fn collect_file(root: &Path, source: &Path, output_root: &Path) -> Result<(TrackedFile, bool)> {
    let rel = source.strip_prefix(root).unwrap_or(source);
    let rel_path = to_slash(rel);

    let hashed = digest::renamed_path(source)?;
    let output_dir = match rel.parent() {
        Some(parent) => output_root.join(parent),
        None => output_root.to_path_buf(),
    };
    let output = match hashed.file_name() {
        Some(name) => output_dir.join(name),
        None => output_dir.join(&hashed),
    };

    // Same name means same content, so an existing copy is already correct
    let copied = match fs::metadata(&output) {
        Ok(_) => false,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(&output_dir).at(&output_dir)?;
            debug!("copy"; "'{}'", rel_path);
            copy_file(source, &output)?;
            true
        }
        Err(e) => return Err(Error::io(&output, e)),
    };

    let output_rel_path = relative_slash(output_root, &output);
    let file = TrackedFile::collected(source.to_path_buf(), rel_path, output, output_rel_path);
    Ok((file, copied))
}

/// Copy `src` to `dst` through a temporary sibling.
///
/// `dst` only appears once its bytes are complete and synced, so an
/// interrupted run never leaves a truncated file under a fingerprinted name.
fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    let tmp = temp_path(dst);
    let copied = write_synced(src, &tmp).and_then(|()| fs::rename(&tmp, dst).at(dst));
    if copied.is_err() {
        fs::remove_file(&tmp).ok();
    }
    copied
}

fn write_synced(src: &Path, dst: &Path) -> Result<()> {
    let mut input = File::open(src).at(src)?;
    let output = File::create(dst).at(dst)?;

    let mut writer = BufWriter::new(output);
    io::copy(&mut input, &mut writer).at(dst)?;
    writer.flush().at(dst)?;

    let output = writer.into_inner().map_err(|e| Error::io(dst, e.into_error()))?;
    output.sync_all().at(dst)
}

/// `dir/name.ext` → `dir/.name.ext.tmp`
fn temp_path(dst: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(dst.file_name().unwrap_or_default());
    name.push(".tmp");
    dst.with_file_name(name)
}

fn relative_slash(base: &Path, path: &Path) -> String {
    to_slash(path.strip_prefix(base).unwrap_or(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir_all(input.join("css")).unwrap();
        fs::create_dir_all(input.join("img")).unwrap();
        fs::write(input.join("css/style.css"), "body { background: url(../img/pix.png); }")
            .unwrap();
        fs::write(input.join("img/pix.png"), b"\x89PNG").unwrap();
        fs::write(input.join("robots.txt"), "User-agent: *").unwrap();
        (dir, input, output)
    }

    #[test]
    fn test_collect_copies_under_fingerprinted_names() {
        let (_dir, input, output) = setup();

        let collected = collect(&[input.clone()], &output, &IgnoreSet::new()).unwrap();
        assert_eq!(collected.files.len(), 3);
        assert_eq!(collected.copied, 3);

        let css = collected.files.get("css/style.css").unwrap();
        let digest = digest::hash_file(&input.join("css/style.css")).unwrap().digest();
        assert_eq!(css.output_rel_path, format!("css/style.{digest}.css"));
        assert_eq!(css.source.as_deref(), Some(input.join("css/style.css").as_path()));
        assert_eq!(
            fs::read(css.output.as_ref().unwrap()).unwrap(),
            fs::read(input.join("css/style.css")).unwrap()
        );

        let robots = collected.files.get("robots.txt").unwrap();
        assert!(robots.output_rel_path.starts_with("robots."));
        assert!(!robots.output_rel_path.contains('/'));
    }

    #[test]
    fn test_existing_copy_is_skipped() {
        let (_dir, input, output) = setup();

        collect(&[input.clone()], &output, &IgnoreSet::new()).unwrap();
        let again = collect(&[input.clone()], &output, &IgnoreSet::new()).unwrap();
        assert_eq!(again.copied, 0);
        assert_eq!(again.files.len(), 3);

        // Changed content gets a new name; the stale copy stays behind
        let old = again.files.get("img/pix.png").unwrap().output_rel_path.clone();
        fs::write(input.join("img/pix.png"), b"abc").unwrap();
        let changed = collect(&[input], &output, &IgnoreSet::new()).unwrap();
        let new = &changed.files.get("img/pix.png").unwrap().output_rel_path;

        assert_eq!(changed.copied, 1);
        assert_ne!(&old, new);
        assert!(output.join(&old).exists());
        assert!(output.join(new).exists());
    }

    #[test]
    fn test_later_root_wins_on_same_relative_path() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        let output = dir.path().join("output");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        fs::write(first.join("app.js"), "first()").unwrap();
        fs::write(second.join("app.js"), "second()").unwrap();

        let collected = collect(&[first, second.clone()], &output, &IgnoreSet::new()).unwrap();
        let app = collected.files.get("app.js").unwrap();

        assert_eq!(collected.files.len(), 1);
        assert_eq!(app.source.as_deref(), Some(second.join("app.js").as_path()));
        assert_eq!(fs::read_to_string(app.output.as_ref().unwrap()).unwrap(), "second()");
    }

    #[test]
    fn test_ignored_files_and_directories() {
        let (_dir, input, output) = setup();
        fs::create_dir_all(input.join("scss/partials")).unwrap();
        fs::write(input.join("scss/partials/_vars.scss"), "$a: 1;").unwrap();
        fs::write(input.join("css/.DS_Store"), "junk").unwrap();

        let mut ignore = IgnoreSet::new();
        ignore.add("scss").unwrap();
        ignore.add(".DS_Store").unwrap();

        let collected = collect(&[input], &output, &ignore).unwrap();
        assert_eq!(collected.files.len(), 3);
        assert!(collected.files.get("scss/partials/_vars.scss").is_none());
        assert!(collected.files.get("css/.DS_Store").is_none());
        assert!(!output.join("scss").exists());
    }

    #[test]
    fn test_missing_root_aborts() {
        let dir = TempDir::new().unwrap();
        let err = collect(
            &[dir.path().join("missing")],
            &dir.path().join("output"),
            &IgnoreSet::new(),
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_output_inside_input_is_not_recollected() {
        let (_dir, input, _) = setup();
        let output = input.join("static");

        collect(&[input.clone()], &output, &IgnoreSet::new()).unwrap();
        let again = collect(&[input], &output, &IgnoreSet::new()).unwrap();
        assert_eq!(again.files.len(), 3);
        assert_eq!(again.copied, 0);
    }

    #[test]
    fn test_copy_leaves_no_temp_file() {
        let (_dir, input, output) = setup();

        // Leftover from an interrupted run
        let hashed = digest::renamed_path(&input.join("img/pix.png")).unwrap();
        let final_path = output.join("img").join(hashed.file_name().unwrap());
        let leftover = temp_path(&final_path);
        fs::create_dir_all(output.join("img")).unwrap();
        fs::write(&leftover, b"\x89").unwrap();

        let collected = collect(&[input.clone()], &output, &IgnoreSet::new()).unwrap();
        let pix = collected.files.get("img/pix.png").unwrap();

        assert_eq!(pix.output.as_deref(), Some(final_path.as_path()));
        assert_eq!(fs::read(&final_path).unwrap(), b"\x89PNG");
        assert!(!leftover.exists());

        let stray: Vec<_> = walkdir::WalkDir::new(&output)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(stray.is_empty(), "{stray:?}");
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("/out/css/style.0123456789ab.css")),
            PathBuf::from("/out/css/.style.0123456789ab.css.tmp")
        );
    }
}
