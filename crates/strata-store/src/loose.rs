//! Loose object storage: one file per object.
//!
//! On-disk format:
//! ```text
//! objects/<first 2 hex digits>/<remaining 38 hex digits>
//! [kind name] [space] [decimal size] [NUL] [data bytes]
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use strata_types::ObjectId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

/// Object store backed by a directory of loose object files.
#[derive(Debug, Clone)]
pub struct LooseObjectStore {
    root: PathBuf,
}

impl LooseObjectStore {
    /// Open a store rooted at `root` (typically `.strata/objects`).
    ///
    /// The directory does not need to exist until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory holding the fan-out subdirectories.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }

    fn decode(id: &ObjectId, raw: &[u8]) -> StoreResult<StoredObject> {
        let corrupt = |reason: &str| StoreError::CorruptObject {
            id: *id,
            reason: reason.to_string(),
        };
        let nul = raw
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| corrupt("missing header terminator"))?;
        let header = std::str::from_utf8(&raw[..nul]).map_err(|_| corrupt("header is not UTF-8"))?;
        let (kind, size) = header
            .split_once(' ')
            .ok_or_else(|| corrupt("malformed header"))?;
        let kind = ObjectKind::from_name(kind).ok_or_else(|| corrupt("unknown object kind"))?;
        let size: u64 = size.parse().map_err(|_| corrupt("malformed size"))?;

        let data = raw[nul + 1..].to_vec();
        if data.len() as u64 != size {
            return Err(corrupt("size does not match header"));
        }
        let object = StoredObject::new(kind, data);
        let computed = object.compute_id();
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        Ok(object)
    }
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        match fs::read(self.object_path(id)) {
            Ok(raw) => Self::decode(id, &raw).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let path = self.object_path(&id);
        if path.exists() {
            return Ok(id);
        }
        let dir = path
            .parent()
            .ok_or_else(|| StoreError::Io(io::Error::other("object path has no parent")))?;
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        write!(tmp, "{} {}\0", object.kind, object.size)?;
        tmp.write_all(&object.data)?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        debug!(%id, kind = %object.kind, "wrote loose object");
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }

    fn find_by_prefix(&self, hex_prefix: &str) -> StoreResult<Vec<ObjectId>> {
        let mut ids = Vec::new();
        let fanouts: Vec<PathBuf> = if hex_prefix.len() >= 2 {
            vec![self.root.join(&hex_prefix[..2])]
        } else {
            match fs::read_dir(&self.root) {
                Ok(rd) => rd
                    .filter_map(Result::ok)
                    .map(|e| e.path())
                    .filter(|p| p.is_dir())
                    .collect(),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ids),
                Err(e) => return Err(e.into()),
            }
        };

        for fanout in fanouts {
            let Some(dir_name) = fanout.file_name().and_then(|n| n.to_str()).map(str::to_owned)
            else {
                continue;
            };
            let entries = match fs::read_dir(&fanout) {
                Ok(rd) => rd,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            for entry in entries {
                let entry = entry?;
                let Some(rest) = entry.file_name().to_str().map(str::to_owned) else {
                    continue;
                };
                let hex = format!("{dir_name}{rest}");
                if !hex.starts_with(hex_prefix) {
                    continue;
                }
                if let Ok(id) = ObjectId::from_hex(&hex) {
                    ids.push(id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
