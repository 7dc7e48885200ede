use strata_types::ObjectId;

use crate::error::StoreResult;
use crate::object::StoredObject;

/// Content-addressed storage of immutable objects.
///
/// An object's ID is a function of its kind and bytes, so writing the same
/// object twice files it once. Stores hand bytes back untouched and surface
/// every I/O failure.
pub trait ObjectStore: Send + Sync {
    /// `Ok(None)` when nothing is filed under `id`.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// File `object` and return its ID. Writing an existing object succeeds.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// All object IDs whose hex spelling starts with `hex_prefix`, sorted.
    ///
    /// `hex_prefix` must be lowercase hex; an empty prefix lists every object.
    fn find_by_prefix(&self, hex_prefix: &str) -> StoreResult<Vec<ObjectId>>;
}
