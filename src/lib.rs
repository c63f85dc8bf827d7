//! Asset fingerprinting for static files.
//!
//! Files under one or more input roots are copied into an output root under
//! content-addressed names (`css/style.98718311206c.css`), post-processed by
//! an ordered list of [`Rule`]s and recorded in a `staticfiles.json` manifest
//! that maps original relative paths to fingerprinted ones.
//!
//! ```ignore
//! let mut storage = Storage::new("public/static")?;
//! storage.add_input_dir("assets");
//! storage.register_rules(default_rules());
//! storage.collect_static()?;
//!
//! assert_eq!(storage.resolve("css/style.css"), "css/style.98718311206c.css");
//! ```

pub mod asset;
pub mod error;
pub mod logger;
pub mod manifest;
pub mod rule;
pub mod storage;
pub mod utils;

pub use asset::{FileMap, TrackedFile};
pub use error::{Error, Result};
pub use rule::{CssReferences, Rule, RuleContext, default_rules, from_fn};
pub use storage::{AssetFs, CollectSummary, OpenFile, Storage};
