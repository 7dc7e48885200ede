//! Shortest-unique fingerprint abbreviation.

use strata_types::{ObjectId, OBJECT_ID_HEX_LEN};

use crate::error::StoreResult;
use crate::traits::ObjectStore;

/// Abbreviation length used when the caller asks for one without a value.
pub const DEFAULT_ABBREV: usize = 7;

/// Requested lengths below this are raised to it.
pub const MINIMUM_ABBREV: usize = 4;

/// Shortest hex prefix of `id`, at least `min_len` digits long, that no other
/// object in `store` shares.
///
/// Objects missing from the store are abbreviated against whatever is there,
/// so an ID the store has never seen still gets a stable short form.
pub fn unique_abbrev(store: &dyn ObjectStore, id: &ObjectId, min_len: usize) -> StoreResult<String> {
    let mut len = min_len.clamp(MINIMUM_ABBREV, OBJECT_ID_HEX_LEN);
    let full = id.to_hex();
    let others: Vec<String> = store
        .find_by_prefix(&full[..len])?
        .into_iter()
        .filter(|other| other != id)
        .map(|other| other.to_hex())
        .collect();

    while len < OBJECT_ID_HEX_LEN && others.iter().any(|o| o[..len] == full[..len]) {
        len += 1;
    }
    Ok(full[..len].to_string())
}
