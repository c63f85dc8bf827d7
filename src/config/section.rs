//! `[collect]` and `[serve]` sections.
//!
//! # Example
//!
//! ```toml
//! [collect]
//! output = "public/static"        # Output root (required)
//! inputs = ["assets", "vendor"]   # Input roots, later roots win on conflicts
//! ignore = ["*.scss", ".DS_Store"]
//! css = true                      # Rewrite stylesheet references
//!
//! [serve]
//! interface = "127.0.0.1"
//! port = 5277
//! enabled = true                  # false = serve the input roots as-is
//! listing = false                 # Allow directory listings
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectConfig {
    /// Output root receiving fingerprinted copies and the manifest.
    pub output: PathBuf,

    /// Input roots in priority order.
    pub inputs: Vec<PathBuf>,

    /// Glob patterns matched against names and relative paths.
    pub ignore: Vec<String>,

    /// Register the built-in stylesheet reference rule.
    pub css: bool,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::new(),
            inputs: Vec::new(),
            ignore: Vec::new(),
            css: true,
        }
    }
}

/// File server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    pub port: u16,

    /// Serve the output root. When `false`, requests pass through to the
    /// input roots unchanged.
    pub enabled: bool,

    /// Allow directory listings.
    pub listing: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5277,
            enabled: true,
            listing: false,
        }
    }
}
