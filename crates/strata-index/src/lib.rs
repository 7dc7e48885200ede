//! Staged index for strata.
//!
//! The index records which content is staged at which path, and at which
//! conflict stage. This crate loads it, answers ordered and prefix queries
//! over it, overlays a historical snapshot onto an in-memory copy of it, and
//! compares its cached file metadata against the working tree.
//!
//! # Key Types
//!
//! - [`IndexView`] -- the sorted, stage-aware in-memory index
//! - [`IndexEntry`] -- one path at one conflict [`Stage`]
//! - [`IndexFile`] -- loader (and fixture writer) for the persisted index
//! - [`SnapshotOverlay`] -- hoist, read a snapshot at stage 1, collapse
//! - [`ResolveUndo`] -- the conflict stages recorded for resolved paths

pub mod entry;
pub mod error;
pub mod file;
pub mod index;
pub mod overlay;
pub mod resolve_undo;
pub mod stat;

pub use entry::{FileTime, IndexEntry, IndexFlags, Stage, StatData};
pub use error::{IndexError, IndexResult};
pub use file::{IndexFile, LoadOptions, LoadedIndex, INDEX_VERSION};
pub use index::{Collision, IndexView, Suppression};
pub use overlay::{OverlaySummary, SnapshotOverlay};
pub use resolve_undo::{ResolveUndo, ResolveUndoRecord};
pub use stat::{is_modified, StatOptions};
