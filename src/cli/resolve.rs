//! `resolve` command.

use std::io::{Write, stdout};

use anyhow::{Context, Result};
use staticfiles::Storage;

use crate::config::Config;

/// Print one resolved path per line; unknown paths print an empty line.
pub fn resolve_paths(config: &Config, paths: &[String]) -> Result<()> {
    let output = &config.collect.output;
    let storage = Storage::new(output)
        .with_context(|| format!("Failed to load manifest from {}", output.display()))?;

    let mut stdout = stdout().lock();
    for path in paths {
        writeln!(stdout, "{}", storage.resolve(path.trim_start_matches('/')))?;
    }
    stdout.flush()?;
    Ok(())
}
