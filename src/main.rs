//! staticfiles - fingerprint static assets and serve the result.

mod cli;
mod config;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    staticfiles::logger::set_verbose(cli.verbose);

    let config = Config::load(&cli)?;

    match &cli.command {
        Commands::Collect(_) => cli::collect::collect_static(&config),
        Commands::Resolve { paths, .. } => cli::resolve::resolve_paths(&config, paths),
        Commands::Serve(_) => cli::serve::serve(&config),
    }
}
