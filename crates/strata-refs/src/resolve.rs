//! Turning a user-supplied name into an object, and peeling it to a tree.
//!
//! Names are tried in this order: `HEAD`, a full 40-digit fingerprint, a
//! canonical `refs/...` name, `refs/tags/<name>`, `refs/heads/<name>`, and
//! finally an abbreviated fingerprint of at least four hex digits.

use strata_store::{ObjectKind, ObjectStore, SnapshotObject, MINIMUM_ABBREV};
use strata_types::{ObjectId, OBJECT_ID_HEX_LEN};
use tracing::debug;

use crate::error::{RefError, Result};
use crate::traits::RefStore;
use crate::types::Head;

fn not_found(name: &str) -> RefError {
    RefError::NotFound {
        name: name.to_string(),
    }
}

/// Resolve `name` to the fingerprint it designates.
pub fn resolve_object(refs: &dyn RefStore, store: &dyn ObjectStore, name: &str) -> Result<ObjectId> {
    if name == "HEAD" {
        return match refs.head()? {
            Some(Head::Detached(id)) => Ok(id),
            Some(Head::Symbolic(branch)) => refs
                .read_ref(&format!("refs/heads/{branch}"))?
                .map(|r| r.target())
                .ok_or_else(|| not_found(name)),
            None => Err(not_found(name)),
        };
    }

    if name.len() == OBJECT_ID_HEX_LEN && ObjectId::is_hex_name(name) {
        if let Ok(id) = ObjectId::from_hex(name) {
            return Ok(id);
        }
    }

    let candidates = [
        name.starts_with("refs/").then(|| name.to_string()),
        Some(format!("refs/tags/{name}")),
        Some(format!("refs/heads/{name}")),
    ];
    for candidate in candidates.into_iter().flatten() {
        if let Some(reference) = refs.read_ref(&candidate)? {
            debug!(name, r#ref = %candidate, "resolved through ref");
            return Ok(reference.target());
        }
    }

    if name.len() >= MINIMUM_ABBREV && ObjectId::is_hex_name(name) {
        let mut matches = store.find_by_prefix(name)?;
        return match matches.len() {
            0 => Err(not_found(name)),
            1 => Ok(matches.remove(0)),
            _ => Err(RefError::Ambiguous {
                name: name.to_string(),
            }),
        };
    }

    Err(not_found(name))
}

/// Resolve `name` and peel it to a tree fingerprint.
///
/// Snapshots peel to their root tree. Anything that does not end at a tree
/// fails with [`RefError::NotATree`]; a name that designates nothing in the
/// store fails with [`RefError::NotFound`].
pub fn resolve_tree(refs: &dyn RefStore, store: &dyn ObjectStore, name: &str) -> Result<ObjectId> {
    let mut id = resolve_object(refs, store, name)?;
    loop {
        let object = store.read(&id)?.ok_or_else(|| not_found(name))?;
        match object.kind {
            ObjectKind::Tree => return Ok(id),
            ObjectKind::Snapshot => {
                let snapshot = SnapshotObject::from_stored_object(&object)?;
                debug!(name, snapshot = %id, tree = %snapshot.tree_id, "peeled snapshot");
                id = snapshot.tree_id;
            }
            kind => {
                return Err(RefError::NotATree {
                    name: name.to_string(),
                    kind,
                })
            }
        }
    }
}
