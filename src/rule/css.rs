//! Stylesheet reference rewriting.
//!
//! Rewrites references inside collected `.css` files so they point at the
//! fingerprinted names of the files they reference:
//!
//! | Shape                        | Example                        |
//! |------------------------------|--------------------------------|
//! | `url(...)`, quotes optional  | `url("../img/pix.png")`        |
//! | `@import "..."`              | `@import 'reset.css'`          |
//! | source map comment           | `sourceMappingURL=style.css.map` |
//!
//! References are resolved against the directory of the *original* file
//! and written into the *output* copy. Only the file name segment of a
//! reference changes; unresolvable references are left untouched.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::asset::TrackedFile;
use crate::debug;
use crate::error::{IoResultExt, Result};
use crate::utils::path::clean;

use super::{Rule, RuleContext};

static REFERENCE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r#"url\(['"]?(?P<url>.*?)['"]?\)"#).unwrap(),
        Regex::new(r#"@import\s*['"](?P<url>.*?)['"]"#).unwrap(),
        Regex::new(r"sourceMappingURL=(?P<url>[-\\.\w]+)").unwrap(),
    ]
});

/// Data URIs, absolute URLs (`https:`, `mailto:` ...).
static SCHEME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+:").unwrap());

/// Rewrites stylesheet references to fingerprinted names.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssReferences;

impl Rule for CssReferences {
    fn name(&self) -> &str {
        "css"
    }

    fn apply(&self, ctx: &RuleContext<'_>, file: &TrackedFile) -> Result<()> {
        if !is_stylesheet(file) {
            return Ok(());
        }
        // Manifest-restored entries have nothing on disk to rewrite
        let (Some(source), Some(output)) = (&file.source, &file.output) else {
            return Ok(());
        };

        let bytes = fs::read(source).at(source)?;
        let Ok(content) = String::from_utf8(bytes) else {
            debug!("css"; "'{}' is not utf-8, left as copied", file.rel_path);
            return Ok(());
        };

        let base_dir = source.parent().unwrap_or(Path::new(""));
        let rewritten = rewrite_references(&content, base_dir, |candidate| {
            ctx.find_by_source(candidate)
                .map(|f| f.output_file_name().to_string())
        });

        if let Some(rewritten) = rewritten {
            fs::write(output, rewritten).at(output)?;
        }
        Ok(())
    }
}

fn is_stylesheet(file: &TrackedFile) -> bool {
    file.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("css"))
}

/// Rewrite every resolvable reference in `content`.
///
/// `lookup` maps the absolute original path a reference resolves to onto
/// the fingerprinted file name. Returns `None` when nothing changed.
pub fn rewrite_references<F>(content: &str, base_dir: &Path, lookup: F) -> Option<String>
where
    F: Fn(&Path) -> Option<String>,
{
    let mut text = content.to_string();
    let mut changed = false;

    for pattern in REFERENCE_PATTERNS.iter() {
        text = pattern
            .replace_all(&text, |caps: &Captures<'_>| {
                let whole = caps.get_match();
                let Some(url) = caps.name("url") else {
                    return whole.as_str().to_string();
                };

                match rewrite_reference(url.as_str(), base_dir, &lookup) {
                    Some(replacement) => {
                        changed = true;
                        let s = whole.as_str();
                        let start = url.start() - whole.start();
                        let end = url.end() - whole.start();
                        format!("{}{}{}", &s[..start], replacement, &s[end..])
                    }
                    None => whole.as_str().to_string(),
                }
            })
            .into_owned();
    }

    changed.then_some(text)
}

/// Rewrite a single reference, or `None` to leave it as is.
fn rewrite_reference<F>(reference: &str, base_dir: &Path, lookup: &F) -> Option<String>
where
    F: Fn(&Path) -> Option<String>,
{
    if reference.is_empty()
        || reference.starts_with('/')
        || reference.starts_with('#')
        || SCHEME.is_match(reference)
    {
        return None;
    }

    // `font.woff?#iefix`: resolve the path, keep the suffix verbatim
    let split = reference.find(['?', '#']).unwrap_or(reference.len());
    let (path, suffix) = reference.split_at(split);
    if path.is_empty() || path.ends_with('/') {
        return None;
    }

    let candidate = clean(&base_dir.join(path));
    let hashed_name = lookup(&candidate)?;

    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    Some(format!("{}{}{}", &path[..name_start], hashed_name, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{FileMap, IgnoreSet, collect};
    use rustc_hash::FxHashMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn lookup_table(entries: &[(&str, &str)]) -> FxHashMap<PathBuf, String> {
        entries
            .iter()
            .map(|(source, name)| (PathBuf::from(source), name.to_string()))
            .collect()
    }

    fn rewrite(content: &str, table: &FxHashMap<PathBuf, String>) -> Option<String> {
        rewrite_references(content, Path::new("/in/css"), |p| table.get(p).cloned())
    }

    #[test]
    fn test_url_forms() {
        let table = lookup_table(&[("/in/img/pix.png", "pix.0123456789ab.png")]);

        for (input, expected) in [
            (
                "a{background:url(../img/pix.png)}",
                "a{background:url(../img/pix.0123456789ab.png)}",
            ),
            (
                "a{background:url('../img/pix.png')}",
                "a{background:url('../img/pix.0123456789ab.png')}",
            ),
            (
                r#"a{background:url("../img/pix.png")}"#,
                r#"a{background:url("../img/pix.0123456789ab.png")}"#,
            ),
        ] {
            assert_eq!(rewrite(input, &table).as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_import_and_source_map() {
        let table = lookup_table(&[
            ("/in/css/reset.css", "reset.aaaaaaaaaaaa.css"),
            ("/in/css/style.css.map", "style.css.bbbbbbbbbbbb.map"),
        ]);
        let input = "@import \"reset.css\";\nbody{}\n/*# sourceMappingURL=style.css.map */";
        let expected =
            "@import \"reset.aaaaaaaaaaaa.css\";\nbody{}\n/*# sourceMappingURL=style.css.bbbbbbbbbbbb.map */";

        assert_eq!(rewrite(input, &table).as_deref(), Some(expected));
    }

    #[test]
    fn test_skipped_references() {
        let table = lookup_table(&[("/in/img/pix.png", "pix.0123456789ab.png")]);

        for input in [
            "a{background:url(data:image/png;base64,iVBOR)}",
            "a{background:url(https://cdn.example.com/img/pix.png)}",
            "a{background:url(/img/pix.png)}",
            "a{background:url(#gradient)}",
            "a{background:url()}",
            "a{background:url(../img/missing.png)}",
        ] {
            assert_eq!(rewrite(input, &table), None, "{input}");
        }
    }

    #[test]
    fn test_query_and_fragment_are_kept() {
        let table = lookup_table(&[("/in/fonts/icons.eot", "icons.0123456789ab.eot")]);
        let input = "src:url('../fonts/icons.eot?#iefix')";

        assert_eq!(
            rewrite(input, &table).as_deref(),
            Some("src:url('../fonts/icons.0123456789ab.eot?#iefix')")
        );
    }

    #[test]
    fn test_only_file_name_segment_changes() {
        // Directory segment shares the file name
        let table = lookup_table(&[("/in/css/pix.png/pix.png", "pix.0123456789ab.png")]);
        assert_eq!(
            rewrite("url(pix.png/pix.png)", &table).as_deref(),
            Some("url(pix.png/pix.0123456789ab.png)")
        );
    }

    fn collect_fixture(css: &str) -> (TempDir, FileMap) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir_all(input.join("css")).unwrap();
        fs::create_dir_all(input.join("img")).unwrap();
        fs::write(input.join("css/style.css"), css).unwrap();
        fs::write(input.join("img/pix.png"), b"\x89PNG").unwrap();

        let collected = collect(&[input], &output, &IgnoreSet::new()).unwrap();
        (dir, collected.files)
    }

    #[test]
    fn test_apply_rewrites_output_copy_only() {
        let css = "body { background: url(../img/pix.png); }";
        let (_dir, files) = collect_fixture(css);
        let ctx = RuleContext::new(&files);

        let style = files.get("css/style.css").unwrap();
        CssReferences.apply(&ctx, style).unwrap();

        let pix = files.get("img/pix.png").unwrap();
        let rewritten = fs::read_to_string(style.output.as_ref().unwrap()).unwrap();
        assert_eq!(
            rewritten,
            format!("body {{ background: url(../img/{}); }}", pix.output_file_name())
        );
        assert_eq!(fs::read_to_string(style.source.as_ref().unwrap()).unwrap(), css);
    }

    #[test]
    fn test_apply_ignores_other_files() {
        let (_dir, files) = collect_fixture("body {}");
        let ctx = RuleContext::new(&files);

        let pix = files.get("img/pix.png").unwrap();
        CssReferences.apply(&ctx, pix).unwrap();
        assert_eq!(fs::read(pix.output.as_ref().unwrap()).unwrap(), b"\x89PNG");

        let restored = TrackedFile::restored("x.css".into(), "x.0123456789ab.css".into());
        CssReferences.apply(&ctx, &restored).unwrap();
    }
}
