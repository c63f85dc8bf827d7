//! Post-processing rules applied to collected files.
//!
//! Rules run after collection has finished, so every file's fingerprinted
//! name is known when a rule resolves a cross-file reference.
//!
//! # Contract
//!
//! - Each rule is invoked once per tracked file, in registration order
//! - Files are visited in unspecified order; rules may only rely on the
//!   file map being complete
//! - Rules may rewrite the *output* copy of a file, never the map itself
//! - The first error aborts the run and is returned unchanged

mod css;

use std::path::Path;

use rustc_hash::FxHashMap;

use crate::asset::{FileMap, TrackedFile};
use crate::debug;
use crate::error::{Error, Result};

pub use css::{CssReferences, rewrite_references};

/// A post-processing step run over every collected file.
pub trait Rule: Send + Sync {
    /// Short name for logs and errors.
    fn name(&self) -> &str;

    fn apply(&self, ctx: &RuleContext<'_>, file: &TrackedFile) -> Result<()>;
}

/// Read-only view of a finished collection handed to rules.
pub struct RuleContext<'a> {
    files: &'a FileMap,
    by_source: FxHashMap<&'a Path, &'a TrackedFile>,
}

impl<'a> RuleContext<'a> {
    pub fn new(files: &'a FileMap) -> Self {
        let by_source = files
            .iter()
            .filter_map(|f| f.source.as_deref().map(|source| (source, f)))
            .collect();

        Self { files, by_source }
    }

    pub fn files(&self) -> &'a FileMap {
        self.files
    }

    /// Find the tracked file collected from `source` (absolute original path).
    pub fn find_by_source(&self, source: &Path) -> Option<&'a TrackedFile> {
        self.by_source.get(source).copied()
    }
}

/// Rule built from a closure.
pub struct FnRule<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a [`Rule`]; failures become [`Error::Rule`].
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnRule<F>
where
    F: Fn(&RuleContext<'_>, &TrackedFile) -> anyhow::Result<()> + Send + Sync,
{
    FnRule {
        name: name.into(),
        f,
    }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&RuleContext<'_>, &TrackedFile) -> anyhow::Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, ctx: &RuleContext<'_>, file: &TrackedFile) -> Result<()> {
        (self.f)(ctx, file).map_err(|source| Error::Rule {
            rule: self.name.clone(),
            path: file.rel_path.clone(),
            source,
        })
    }
}

/// Built-in rules a caller may opt into.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(CssReferences)]
}

/// Apply every rule to every file.
pub fn run_rules(files: &FileMap, rules: &[Box<dyn Rule>]) -> Result<()> {
    if rules.is_empty() {
        return Ok(());
    }

    let ctx = RuleContext::new(files);
    for file in files.iter() {
        for rule in rules {
            debug!("rule"; "{} '{}'", rule.name(), file.rel_path);
            rule.apply(&ctx, file)?;
        }
    }

    Ok(())
}
