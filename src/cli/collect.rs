//! `collect` command.

use anyhow::{Context, Result};
use staticfiles::{Storage, default_rules, log};

use crate::config::Config;

/// Collect every input root into the output root and write the manifest.
///
/// Any existing manifest is rebuilt from scratch, including one written by
/// an incompatible version.
pub fn collect_static(config: &Config) -> Result<()> {
    let collect = &config.collect;

    let mut storage = Storage::empty(&collect.output);
    for input in &collect.inputs {
        storage.add_input_dir(input);
    }
    for pattern in &collect.ignore {
        storage.add_ignore_pattern(pattern)?;
    }
    if collect.css {
        storage.register_rules(default_rules());
    }

    let summary = storage
        .collect_static()
        .with_context(|| format!("Failed to collect into {}", collect.output.display()))?;

    log!(
        "collect";
        "collected {} files ({} copied) into {}",
        summary.files,
        summary.copied,
        storage.output_root().display()
    );
    Ok(())
}
