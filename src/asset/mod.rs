//! Asset collection and fingerprinting.

mod collect;
pub mod digest;
mod ignore;
mod tracked;

// Types
pub use ignore::IgnoreSet;
pub use tracked::{FileMap, TrackedFile};

// Collection (side effects)
pub use collect::{Collected, collect};

// Digest naming
pub use digest::{ContentHash, renamed_path};
