//! Reference management and snapshot-name resolution for strata.
//!
//! References are the human-readable entry points into history: branches and
//! tags point at snapshot (or tree) fingerprints, and HEAD names the current
//! branch or a detached fingerprint.
//!
//! # Modules
//!
//! - [`error`]: Error types for ref operations
//! - [`types`]: Core ref types: [`Ref`], [`Head`]
//! - [`traits`]: The [`RefStore`] trait defining the storage interface
//! - [`names`]: Ref name validation
//! - [`memory`]: In-memory [`InMemoryRefStore`] for tests
//! - [`files`]: [`FileRefStore`] reading `HEAD` and `refs/` from disk
//! - [`resolve`]: [`resolve_object`] and [`resolve_tree`]

pub mod error;
pub mod files;
pub mod memory;
pub mod names;
pub mod resolve;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use files::FileRefStore;
pub use memory::InMemoryRefStore;
pub use names::validate_ref_name;
pub use resolve::{resolve_object, resolve_tree};
pub use traits::RefStore;
pub use types::{Head, Ref};
