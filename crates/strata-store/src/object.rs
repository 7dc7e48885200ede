use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strata_types::{ContentHasher, ObjectId};

use crate::error::{StoreError, StoreResult};

/// What a stored object holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// File contents.
    Blob,
    /// One directory level: names mapped to modes and object IDs.
    Tree,
    /// A recorded point in history naming a root tree.
    Snapshot,
}

impl ObjectKind {
    /// Parse the name used in loose object headers.
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Blob, Self::Tree, Self::Snapshot]
            .into_iter()
            .find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Snapshot => "snapshot",
        }
    }

    fn hasher(self) -> &'static ContentHasher {
        match self {
            Self::Blob => &ContentHasher::BLOB,
            Self::Tree => &ContentHasher::TREE,
            Self::Snapshot => &ContentHasher::SNAPSHOT,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The unit of storage: a kind tag and opaque bytes, addressed by the hash
/// of those bytes under the kind's hasher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
    /// Length of `data`.
    pub size: u64,
}

impl StoredObject {
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// The object's content address.
    ///
    /// Blobs hash with [`ContentHasher::BLOB`] over the raw bytes, so a
    /// working-tree file can be fingerprinted without going through a store.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }

    fn expect_kind(&self, kind: ObjectKind) -> StoreResult<()> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(StoreError::CorruptObject {
                id: self.compute_id(),
                reason: format!("expected {kind}, got {}", self.kind),
            })
        }
    }
}

fn encode<T: Serialize>(kind: ObjectKind, value: &T) -> StoreResult<StoredObject> {
    let data = serde_json::to_vec(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(StoredObject::new(kind, data))
}

fn decode<T: DeserializeOwned>(obj: &StoredObject, kind: ObjectKind) -> StoreResult<T> {
    obj.expect_kind(kind)?;
    serde_json::from_slice(&obj.data).map_err(|e| StoreError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// File contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Blob)?;
        Ok(Self::new(obj.data.clone()))
    }
}

// ---------------------------------------------------------------------------
// Entry modes
// ---------------------------------------------------------------------------

/// Kind and permissions of a tracked path, shared by trees and the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    Regular,
    Executable,
    Symlink,
    /// A directory-level entry: a subtree in a tree object, or a directory
    /// recorded as a whole in the index.
    Directory,
}

impl EntryMode {
    const TABLE: [(EntryMode, u32); 4] = [
        (EntryMode::Regular, 0o100644),
        (EntryMode::Executable, 0o100755),
        (EntryMode::Symlink, 0o120000),
        (EntryMode::Directory, 0o040000),
    ];

    /// Unix-style octal mode.
    pub fn mode_bits(&self) -> u32 {
        Self::TABLE
            .iter()
            .find(|(mode, _)| mode == self)
            .map_or(0, |(_, bits)| *bits)
    }

    pub fn from_mode_bits(bits: u32) -> Option<Self> {
        Self::TABLE.iter().find(|(_, b)| *b == bits).map(|(mode, _)| *mode)
    }

    /// Regular or executable file.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::Regular | Self::Executable)
    }

    pub fn is_directory(&self) -> bool {
        *self == Self::Directory
    }
}

/// Six octal digits, as printed in stage columns.
impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// One name in a tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub mode: EntryMode,
    /// A single path component.
    pub name: String,
    pub object_id: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: EntryMode, name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            object_id,
        }
    }
}

/// One directory level. Entries are kept sorted by name so equal trees hash
/// equally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self { entries }
    }

    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        encode(ObjectKind::Tree, self)
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        decode(obj, ObjectKind::Tree)
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.entries[i])
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A recorded point in history. Names resolve through snapshots to their
/// root tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotObject {
    pub tree_id: ObjectId,
    pub parent: Option<ObjectId>,
    pub message: String,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
}

impl SnapshotObject {
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        encode(ObjectKind::Snapshot, self)
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        decode(obj, ObjectKind::Snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_id_is_the_plain_content_hash() {
        let stored = Blob::new(b"file body".to_vec()).to_stored_object();
        assert_eq!(stored.compute_id(), ContentHasher::BLOB.hash(b"file body"));
        assert_eq!(stored.size, 9);
    }

    #[test]
    fn decoding_checks_the_kind() {
        let tree_bytes = StoredObject::new(ObjectKind::Tree, b"[]".to_vec());
        assert!(matches!(
            Blob::from_stored_object(&tree_bytes),
            Err(StoreError::CorruptObject { .. })
        ));

        let snapshot = SnapshotObject {
            tree_id: ObjectId::from_bytes(b"root"),
            parent: None,
            message: "initial".into(),
            timestamp: 1000,
        };
        let stored = snapshot.to_stored_object().unwrap();
        assert!(matches!(
            Tree::from_stored_object(&stored),
            Err(StoreError::CorruptObject { .. })
        ));
        assert_eq!(SnapshotObject::from_stored_object(&stored).unwrap(), snapshot);
    }

    #[test]
    fn garbage_tree_data_is_a_serialization_error() {
        let stored = StoredObject::new(ObjectKind::Tree, b"not json".to_vec());
        assert!(matches!(
            Tree::from_stored_object(&stored),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn trees_sort_and_look_up_by_name() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, "zebra.txt", ObjectId::null()),
            TreeEntry::new(EntryMode::Regular, "alpha.txt", ObjectId::null()),
            TreeEntry::new(EntryMode::Directory, "middle", ObjectId::null()),
        ]);
        let names: Vec<&str> = tree.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.txt", "middle", "zebra.txt"]);
        assert_eq!(tree.get("middle").map(|e| e.mode), Some(EntryMode::Directory));
        assert!(tree.get("absent").is_none());

        let stored = tree.to_stored_object().unwrap();
        assert_eq!(Tree::from_stored_object(&stored).unwrap(), tree);
    }

    #[test]
    fn entry_modes_print_as_octal() {
        assert_eq!(EntryMode::Regular.to_string(), "100644");
        assert_eq!(EntryMode::Executable.to_string(), "100755");
        assert_eq!(EntryMode::Symlink.to_string(), "120000");
        assert_eq!(EntryMode::Directory.to_string(), "040000");
        assert_eq!(EntryMode::from_mode_bits(0o100755), Some(EntryMode::Executable));
        assert!(EntryMode::from_mode_bits(0o777).is_none());
    }

    #[test]
    fn same_bytes_different_kinds_differ() {
        let blob = StoredObject::new(ObjectKind::Blob, b"same".to_vec());
        let tree = StoredObject::new(ObjectKind::Tree, b"same".to_vec());
        assert_ne!(blob.compute_id(), tree.compute_id());
    }

    #[test]
    fn kind_names() {
        for kind in [ObjectKind::Blob, ObjectKind::Tree, ObjectKind::Snapshot] {
            assert_eq!(ObjectKind::from_name(&kind.to_string()), Some(kind));
        }
        assert_eq!(ObjectKind::from_name("pack"), None);
    }
}
