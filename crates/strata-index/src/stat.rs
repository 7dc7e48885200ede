//! Comparing cached index metadata against the working tree.

use std::fs::{self, Metadata};
use std::path::Path;

use strata_store::EntryMode;
use strata_types::ContentHasher;

use crate::entry::{IndexEntry, StatData};

/// Knobs for [`is_modified`].
#[derive(Clone, Copy, Debug)]
pub struct StatOptions {
    /// Treat an mtime difference alone as a modification.
    pub check_mtime: bool,
}

impl Default for StatOptions {
    fn default() -> Self {
        Self { check_mtime: true }
    }
}

/// Whether the working-tree file at `file`, whose `symlink_metadata` is
/// `meta`, differs from what `entry` recorded.
///
/// A type or executable-bit change is a modification. Otherwise size and
/// mtime decide, unless the cached size is zero (unknown), in which case the
/// content is hashed and compared with the staged fingerprint.
pub fn is_modified(entry: &IndexEntry, file: &Path, meta: &Metadata, opts: &StatOptions) -> bool {
    if entry.flags.assume_valid {
        return false;
    }
    let ft = meta.file_type();
    let same_type = match entry.mode {
        EntryMode::Regular | EntryMode::Executable => ft.is_file(),
        EntryMode::Symlink => ft.is_symlink(),
        EntryMode::Directory => return !ft.is_dir(),
    };
    if !same_type || exec_bit_changed(entry.mode, meta) {
        return true;
    }

    if entry.stat.size == 0 {
        return !content_matches(entry, file);
    }
    if meta.len() != entry.stat.size {
        return true;
    }
    opts.check_mtime && StatData::from_metadata(meta).mtime != entry.stat.mtime
}

#[cfg(unix)]
fn exec_bit_changed(mode: EntryMode, meta: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    if !mode.is_file() {
        return false;
    }
    let executable = meta.permissions().mode() & 0o111 != 0;
    executable != (mode == EntryMode::Executable)
}

#[cfg(not(unix))]
fn exec_bit_changed(_mode: EntryMode, _meta: &Metadata) -> bool {
    false
}

fn content_matches(entry: &IndexEntry, file: &Path) -> bool {
    let data = match entry.mode {
        EntryMode::Symlink => fs::read_link(file).map(|t| t.to_string_lossy().into_owned().into_bytes()),
        _ => fs::read(file),
    };
    match data {
        Ok(data) => ContentHasher::BLOB.verify(&data, &entry.object_id),
        Err(_) => false,
    }
}
