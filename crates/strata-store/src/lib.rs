//! Content-addressed object storage for strata.
//!
//! Every piece of historical content (file blobs, directory trees, snapshots)
//! is stored as an immutable object identified by its fingerprint, a
//! domain-separated hash of its kind and bytes.
//!
//! Objects are [`Blob`]s, [`Tree`]s and [`SnapshotObject`]s. Two backends
//! implement [`ObjectStore`]: [`LooseObjectStore`] keeps one file per object
//! under `objects/xx/...`, and [`InMemoryObjectStore`] backs tests.
//!
//! [`unique_abbrev`] shortens a fingerprint to the shortest prefix that is
//! still unambiguous within a store.

pub mod abbrev;
pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;

pub use abbrev::{unique_abbrev, DEFAULT_ABBREV, MINIMUM_ABBREV};
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, EntryMode, ObjectKind, SnapshotObject, StoredObject, Tree, TreeEntry};
pub use traits::ObjectStore;
