//! Configuration management for `staticfiles.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                        |
//! |-------------|------------------------------------------------|
//! | `[collect]` | Output root, input roots, ignore globs, rules  |
//! | `[serve]`   | File server (interface, port, passthrough)     |
//!
//! The file is optional. Command line flags override its values; relative
//! paths in the file are resolved against the file's directory, relative
//! paths on the command line against the working directory.

mod error;
mod section;

pub use error::ConfigError;
pub use section::{CollectConfig, ServeConfig};

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use staticfiles::{debug, utils::path::normalize_path};

use crate::cli::{Cli, CollectArgs, Commands, ServeArgs};

/// Root configuration structure representing staticfiles.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory of the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub collect: CollectConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl Config {
    /// Load configuration for the current command.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        Self::load_from(cli, &cwd)
    }

    fn load_from(cli: &Cli, cwd: &Path) -> Result<Self> {
        let config_path = normalize_path(&cwd.join(&cli.config));

        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            debug!("config"; "'{}' not found, using defaults", cli.config.display());
            Self::default()
        };

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf());
        config.normalize_paths(&root);
        config.root = root;
        debug!("config"; "root '{}'", config.root.display());

        config.apply_command_options(&cli.command, cwd);
        config.validate(&cli.command)?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, command: &Commands, cwd: &Path) {
        match command {
            Commands::Collect(args) => self.apply_collect_args(args, cwd),
            Commands::Resolve { output, .. } => self.apply_output(output.as_deref(), cwd),
            Commands::Serve(args) => self.apply_serve_args(args, cwd),
        }
    }

    fn apply_collect_args(&mut self, args: &CollectArgs, cwd: &Path) {
        self.apply_output(args.output.as_deref(), cwd);
        self.apply_inputs(&args.inputs, cwd);
        self.collect.ignore.extend(args.ignore.iter().cloned());
        if args.no_css {
            self.collect.css = false;
        }
    }

    fn apply_serve_args(&mut self, args: &ServeArgs, cwd: &Path) {
        self.apply_output(args.output.as_deref(), cwd);
        self.apply_inputs(&args.inputs, cwd);
        Self::update_option(&mut self.serve.interface, args.interface.as_ref());
        Self::update_option(&mut self.serve.port, args.port.as_ref());
        if args.passthrough {
            self.serve.enabled = false;
        }
        if args.listing {
            self.serve.listing = true;
        }
    }

    fn apply_output(&mut self, output: Option<&Path>, cwd: &Path) {
        if let Some(output) = output {
            self.collect.output = normalize_path(&cwd.join(output));
        }
    }

    /// Inputs given on the command line replace the configured list.
    fn apply_inputs(&mut self, inputs: &[PathBuf], cwd: &Path) {
        if !inputs.is_empty() {
            self.collect.inputs = inputs.iter().map(|p| normalize_path(&cwd.join(p))).collect();
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve configured paths against the config file's directory.
    fn normalize_paths(&mut self, root: &Path) {
        if !self.collect.output.as_os_str().is_empty() {
            self.collect.output = normalize_path(&root.join(&self.collect.output));
        }
        self.collect.inputs = self
            .collect
            .inputs
            .iter()
            .map(|p| normalize_path(&root.join(p)))
            .collect();
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration for the current command.
    pub fn validate(&self, command: &Commands) -> Result<(), ConfigError> {
        if self.collect.output.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "`collect.output` is not set, pass `-o <dir>` or set it in staticfiles.toml".into(),
            ));
        }

        match command {
            Commands::Collect(_) => self.validate_collect(),
            Commands::Serve(_) if !self.serve.enabled && self.collect.inputs.is_empty() => Err(
                ConfigError::Validation("passthrough serving needs at least one input root".into()),
            ),
            _ => Ok(()),
        }
    }

    fn validate_collect(&self) -> Result<(), ConfigError> {
        if self.collect.inputs.is_empty() {
            return Err(ConfigError::Validation(
                "no input roots, pass `-i <dir>` or set `collect.inputs`".into(),
            ));
        }

        // The output would be collected again on the next run
        if let Some(input) = self
            .collect
            .inputs
            .iter()
            .find(|input| self.collect.output.starts_with(input))
        {
            return Err(ConfigError::Validation(format!(
                "output root `{}` lies inside input root `{}`",
                self.collect.output.display(),
                input.display()
            )));
        }
        Ok(())
    }
}

/// Parse config from a TOML snippet.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    Config::from_str(content).unwrap()
}

// ============================================================================
// tests
// ============================================================================
