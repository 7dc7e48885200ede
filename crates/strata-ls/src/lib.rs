//! # strata-ls
//!
//! Lists paths by reconciling three views of a repository: the staged index,
//! the working tree, and optionally a historical snapshot overlaid onto the
//! index in memory.
//!
//! The [`ReconciliationEngine`] runs the passes; records flow into a
//! [`RecordSink`], either collected into a `Vec<Record>` or rendered by a
//! [`RecordWriter`]. [`run`] wires a [`Repository`] to all of it.

pub mod config;
pub mod engine;
pub mod error;
pub mod killed;
pub mod quote;
pub mod record;
pub mod repo;
pub mod request;
pub mod run;
pub mod tag;

pub use config::{CoreConfig, RepoConfig};
pub use engine::{Outcome, ReconciliationEngine, Workspace};
pub use error::{LsError, Result};
pub use killed::is_killed;
pub use quote::format_path;
pub use record::{OutputFormat, Record, RecordSink, RecordWriter, StageInfo};
pub use repo::Repository;
pub use request::{LsRequest, Terminator};
pub use run::run;
pub use tag::Tag;
