//! Command-line interface module.

mod args;
pub mod collect;
pub mod resolve;
pub mod serve;

pub use args::{Cli, CollectArgs, Commands, ServeArgs};
