use std::collections::BTreeMap;
use std::sync::RwLock;

use strata_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Object store held entirely in memory, for tests and throwaway work trees.
///
/// Objects are kept ordered by ID, so prefix lookups are a range scan.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<ObjectId, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_count(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        Ok(self.objects.read().expect("lock poisoned").get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        self.objects
            .write()
            .expect("lock poisoned")
            .entry(id)
            .or_insert_with(|| object.clone());
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.objects.read().expect("lock poisoned").contains_key(id))
    }

    fn find_by_prefix(&self, hex_prefix: &str) -> StoreResult<Vec<ObjectId>> {
        let objects = self.objects.read().expect("lock poisoned");
        Ok(objects
            .keys()
            .filter(|id| id.to_hex().starts_with(hex_prefix))
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Blob, EntryMode, ObjectKind, Tree, TreeEntry};

    fn blob(content: &[u8]) -> StoredObject {
        Blob::new(content.to_vec()).to_stored_object()
    }

    #[test]
    fn objects_read_back_as_written() {
        let store = InMemoryObjectStore::new();
        let stored = blob(b"contents of a.txt");
        let id = store.write(&stored).unwrap();
        assert_eq!(store.read(&id).unwrap(), Some(stored));
        assert_eq!(store.read(&ObjectId::from_bytes(b"other")).unwrap(), None);

        let tree = Tree::new(vec![TreeEntry::new(EntryMode::Regular, "a.txt", id)]);
        let tree_id = store.write(&tree.to_stored_object().unwrap()).unwrap();
        let back = store.read(&tree_id).unwrap().unwrap();
        assert_eq!(back.kind, ObjectKind::Tree);
        assert_eq!(Tree::from_stored_object(&back).unwrap().get("a.txt").map(|e| e.object_id), Some(id));
    }

    #[test]
    fn rewriting_an_object_keeps_one_copy() {
        let store = InMemoryObjectStore::new();
        let first = store.write(&blob(b"twice")).unwrap();
        let second = store.write(&blob(b"twice")).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.object_count(), 1);
        assert!(store.exists(&first).unwrap());
    }

    #[test]
    fn prefix_lookup_is_sorted() {
        let store = InMemoryObjectStore::new();
        let mut ids: Vec<ObjectId> = [b"x".as_slice(), b"y", b"z"]
            .into_iter()
            .map(|body| store.write(&blob(body)).unwrap())
            .collect();
        ids.sort();
        assert_eq!(store.find_by_prefix("").unwrap(), ids);
        assert_eq!(store.find_by_prefix(&ids[1].to_hex()).unwrap(), vec![ids[1]]);
    }
}
