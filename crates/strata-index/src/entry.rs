//! Index entry types: one staged path at one conflict stage.

use std::fs::Metadata;

use serde::{Deserialize, Serialize};
use strata_store::EntryMode;
use strata_types::ObjectId;

/// Conflict stage of an index entry.
///
/// Stage 0 is the resolved state; stages 1 to 3 hold the base, ours and
/// theirs sides of an unresolved conflict.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Merged = 0,
    Base = 1,
    Ours = 2,
    Theirs = 3,
}

impl Stage {
    /// Numeric stage value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse a numeric stage value.
    pub fn from_u8(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::Merged),
            1 => Some(Self::Base),
            2 => Some(Self::Ours),
            3 => Some(Self::Theirs),
            _ => None,
        }
    }

    /// Returns `true` for stage 0.
    pub fn is_merged(self) -> bool {
        self == Self::Merged
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// A filesystem timestamp with nanosecond precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileTime {
    pub secs: i64,
    pub nanos: u32,
}

impl FileTime {
    pub fn new(secs: i64, nanos: u32) -> Self {
        Self { secs, nanos }
    }
}

impl std::fmt::Display for FileTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.secs, self.nanos)
    }
}

/// File metadata cached in the index, used only for modification checks.
///
/// A zero `size` means the size is unknown (entries read from a snapshot
/// carry no metadata).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatData {
    pub ctime: FileTime,
    pub mtime: FileTime,
    pub dev: u64,
    pub ino: u64,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
}

impl StatData {
    /// Capture the cached fields from freshly read metadata.
    #[cfg(unix)]
    pub fn from_metadata(meta: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            ctime: FileTime::new(meta.ctime(), meta.ctime_nsec() as u32),
            mtime: FileTime::new(meta.mtime(), meta.mtime_nsec() as u32),
            dev: meta.dev(),
            ino: meta.ino(),
            uid: meta.uid(),
            gid: meta.gid(),
            size: meta.len(),
        }
    }

    /// Capture the cached fields from freshly read metadata.
    #[cfg(not(unix))]
    pub fn from_metadata(meta: &Metadata) -> Self {
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| FileTime::new(d.as_secs() as i64, d.subsec_nanos()))
            .unwrap_or_default();
        Self {
            ctime: mtime,
            mtime,
            size: meta.len(),
            ..Self::default()
        }
    }
}

/// Persistent per-entry flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexFlags {
    /// The working-tree file is assumed unchanged and never probed.
    pub assume_valid: bool,
    /// The path is not materialized in the working tree.
    pub skip_worktree: bool,
}

/// An entry in the staged index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// `/`-separated path relative to the work tree root.
    pub path: String,
    /// Fingerprint of the staged content.
    pub object_id: ObjectId,
    /// File mode (regular, executable, symlink, directory).
    pub mode: EntryMode,
    /// Conflict stage.
    pub stage: Stage,
    /// Cached filesystem metadata.
    pub stat: StatData,
    /// Persistent flags.
    pub flags: IndexFlags,
}

impl IndexEntry {
    /// Create a stage-0 entry with no cached metadata.
    pub fn new(path: impl Into<String>, object_id: ObjectId, mode: EntryMode) -> Self {
        Self {
            path: path.into(),
            object_id,
            mode,
            stage: Stage::Merged,
            stat: StatData::default(),
            flags: IndexFlags::default(),
        }
    }

    /// Builder: set the conflict stage.
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    /// Builder: set the cached metadata.
    pub fn with_stat(mut self, stat: StatData) -> Self {
        self.stat = stat;
        self
    }

    /// Builder: set the persistent flags.
    pub fn with_flags(mut self, flags: IndexFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sort key: path in byte order, then stage.
    pub fn sort_key(&self) -> (&str, Stage) {
        (&self.path, self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_is_merged_without_metadata() {
        let entry = IndexEntry::new("a.txt", ObjectId::from_bytes(b"a"), EntryMode::Regular);
        assert_eq!(entry.stage, Stage::Merged);
        assert_eq!(entry.stat.size, 0);
        assert!(!entry.flags.assume_valid);
        assert!(!entry.flags.skip_worktree);
    }

    #[test]
    fn sort_key_orders_by_path_then_stage() {
        let id = ObjectId::null();
        let mut entries = vec![
            IndexEntry::new("b", id, EntryMode::Regular),
            IndexEntry::new("a", id, EntryMode::Regular).with_stage(Stage::Theirs),
            IndexEntry::new("a", id, EntryMode::Regular).with_stage(Stage::Base),
            IndexEntry::new("a/x", id, EntryMode::Regular),
            IndexEntry::new("a.c", id, EntryMode::Regular),
        ];
        entries.sort_by(|x, y| x.sort_key().cmp(&y.sort_key()));
        let keys: Vec<(&str, u8)> = entries
            .iter()
            .map(|e| (e.path.as_str(), e.stage.as_u8()))
            .collect();
        assert_eq!(keys, vec![("a", 1), ("a", 3), ("a.c", 0), ("a/x", 0), ("b", 0)]);
    }

    #[test]
    fn stage_numbers() {
        for n in 0..4 {
            assert_eq!(Stage::from_u8(n).unwrap().as_u8(), n);
        }
        assert!(Stage::from_u8(4).is_none());
        assert!(Stage::Merged.is_merged());
        assert_eq!(Stage::Ours.to_string(), "2");
    }

    #[test]
    fn stat_from_metadata_captures_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, b"twelve bytes").unwrap();
        let stat = StatData::from_metadata(&std::fs::symlink_metadata(&path).unwrap());
        assert_eq!(stat.size, 12);
    }
}
