//! The [`RefStore`] trait defining the reference storage interface.

use crate::error::Result;
use crate::types::{Head, Ref};

/// Storage backend for named references.
///
/// The namespace follows a hierarchical layout:
///
/// - `refs/heads/*` for branches
/// - `refs/tags/*` for tags
pub trait RefStore: Send + Sync {
    /// Read a ref by its canonical name (e.g. "refs/heads/main").
    ///
    /// Returns `Ok(None)` if the ref does not exist.
    fn read_ref(&self, name: &str) -> Result<Option<Ref>>;

    /// Write (create or update) a ref at its canonical name.
    ///
    /// Fails with `TagImmutable` if a tag already exists at that name.
    fn write_ref(&self, reference: &Ref) -> Result<()>;

    /// Read the current HEAD state.
    ///
    /// Returns `Ok(None)` if HEAD has not been set.
    fn head(&self) -> Result<Option<Head>>;

    /// Set HEAD to point at a branch (symbolic ref).
    fn set_head(&self, branch: &str) -> Result<()>;
}
