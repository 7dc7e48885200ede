//! The persisted index file.
//!
//! On-disk format:
//! ```text
//! [4 bytes: magic "SIDX"]
//! [4 bytes: version (little-endian u32)]
//! [N bytes: bincode body (entries, resolve-undo records)]
//! [32 bytes: BLAKE3 of everything before it]
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_pathspec::Pathspec;
use tracing::debug;

use crate::entry::IndexEntry;
use crate::error::{IndexError, IndexResult};
use crate::index::IndexView;
use crate::resolve_undo::ResolveUndo;

const MAGIC: &[u8; 4] = b"SIDX";

/// Current index format version.
pub const INDEX_VERSION: u32 = 1;

const HEADER_SIZE: usize = 8;
const CHECKSUM_SIZE: usize = 32;

#[derive(Serialize)]
struct BodyRef<'a> {
    entries: &'a [IndexEntry],
    resolve_undo: &'a ResolveUndo,
}

#[derive(Deserialize)]
struct Body {
    entries: Vec<IndexEntry>,
    resolve_undo: ResolveUndo,
}

/// What to keep when loading.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoadOptions<'a> {
    /// Keep only entries under this filter set's common prefix.
    pub pathspec: Option<&'a Pathspec>,
    /// Keep resolve-undo records.
    pub resolve_undo: bool,
}

/// A loaded index together with the common prefix it was restricted to.
#[derive(Clone, Debug)]
pub struct LoadedIndex {
    pub view: IndexView,
    pub prefix: String,
}

/// Reader and writer for the persisted index.
#[derive(Debug)]
pub struct IndexFile;

impl IndexFile {
    /// Load the index at `path`. A missing file is an empty index.
    pub fn load(path: &Path, opts: &LoadOptions<'_>) -> IndexResult<LoadedIndex> {
        match fs::read(path) {
            Ok(bytes) => Self::decode(&bytes, opts),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no index file; using an empty index");
                Ok(LoadedIndex {
                    view: IndexView::new(),
                    prefix: prefix_of(opts),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Decode index bytes.
    pub fn decode(bytes: &[u8], opts: &LoadOptions<'_>) -> IndexResult<LoadedIndex> {
        if bytes.len() < HEADER_SIZE + CHECKSUM_SIZE {
            return Err(IndexError::Corrupt("file too short".into()));
        }
        if &bytes[..4] != MAGIC {
            return Err(IndexError::Corrupt("bad signature".into()));
        }
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != INDEX_VERSION {
            return Err(IndexError::Corrupt(format!("unsupported version {version}")));
        }
        let (content, checksum) = bytes.split_at(bytes.len() - CHECKSUM_SIZE);
        if blake3::hash(content).as_bytes() != checksum {
            return Err(IndexError::Corrupt("checksum mismatch".into()));
        }

        let body: Body = bincode::deserialize(&content[HEADER_SIZE..])
            .map_err(|e| IndexError::Corrupt(e.to_string()))?;

        let prefix = prefix_of(opts);
        let total = body.entries.len();
        let entries: Vec<IndexEntry> = body
            .entries
            .into_iter()
            .filter(|e| e.path.starts_with(&prefix))
            .collect();
        let kept = entries.len();
        let mut view = IndexView::from_entries(entries)?;
        if opts.resolve_undo {
            let mut resolve_undo = body.resolve_undo;
            resolve_undo.retain_under(&prefix);
            view = view.with_resolve_undo(resolve_undo);
        }
        debug!(total, kept, prefix = %prefix, "loaded index");
        Ok(LoadedIndex { view, prefix })
    }

    /// Encode an index, suppression markers excluded.
    pub fn encode(view: &IndexView) -> IndexResult<Vec<u8>> {
        let body = bincode::serialize(&BodyRef {
            entries: view.entries(),
            resolve_undo: view.resolve_undo(),
        })
        .map_err(|e| IndexError::Serialization(e.to_string()))?;

        let mut out = Vec::with_capacity(HEADER_SIZE + body.len() + CHECKSUM_SIZE);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&INDEX_VERSION.to_le_bytes());
        out.extend_from_slice(&body);
        let checksum = blake3::hash(&out);
        out.extend_from_slice(checksum.as_bytes());
        Ok(out)
    }

    /// Write an index file atomically. Used to build fixtures.
    pub fn write(path: &Path, view: &IndexView) -> IndexResult<()> {
        let bytes = Self::encode(view)?;
        let dir = path
            .parent()
            .ok_or_else(|| IndexError::Io(io::Error::other("index path has no parent")))?;
        fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(path).map_err(|e| IndexError::Io(e.error))?;
        debug!(path = %path.display(), entries = view.len(), "wrote index");
        Ok(())
    }
}

fn prefix_of(opts: &LoadOptions<'_>) -> String {
    opts.pathspec
        .map(|p| p.common_prefix().to_string())
        .unwrap_or_default()
}
