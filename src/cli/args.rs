//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Fingerprint static files and serve the result
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: staticfiles.toml)
    #[arg(short = 'C', long, global = true, default_value = "staticfiles.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Copy input files to fingerprinted names and write the manifest
    #[command(visible_alias = "c")]
    Collect(CollectArgs),

    /// Print the fingerprinted path for each original path
    #[command(visible_alias = "r")]
    Resolve {
        /// Output directory holding staticfiles.json
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        output: Option<PathBuf>,

        /// Original relative paths (e.g. css/style.css)
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Serve the collected files over HTTP
    #[command(visible_alias = "s")]
    Serve(ServeArgs),
}

/// Collect command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct CollectArgs {
    /// Output directory
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Input directory, repeatable; later directories win on conflicts
    #[arg(short, long = "input", value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    pub inputs: Vec<PathBuf>,

    /// Glob pattern of files or directories to skip, repeatable
    #[arg(long, value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Do not rewrite references inside stylesheets
    #[arg(long)]
    pub no_css: bool,
}

/// Serve command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Output directory
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Input directory, used with --passthrough
    #[arg(short, long = "input", value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    pub inputs: Vec<PathBuf>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(long)]
    pub interface: Option<std::net::IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Serve the input directories as-is instead of the output directory
    #[arg(long)]
    pub passthrough: bool,

    /// Allow directory listings
    #[arg(short, long)]
    pub listing: bool,
}
