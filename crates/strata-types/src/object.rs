use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of bytes in an [`ObjectId`].
pub const OBJECT_ID_LEN: usize = 20;

/// Number of hex digits in a fully spelled-out [`ObjectId`].
pub const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_LEN * 2;

/// Content fingerprint for any stored object.
///
/// An `ObjectId` is the first 20 bytes of a BLAKE3 hash over an object's
/// content. Identical content always produces the same `ObjectId`, so index
/// entries, tree entries and stored objects can be compared by fingerprint
/// alone.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Compute an `ObjectId` from raw bytes (no domain separation).
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_digest(blake3::hash(data).as_bytes())
    }

    /// Truncate a full 32-byte digest to a fingerprint.
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        let mut arr = [0u8; OBJECT_ID_LEN];
        arr.copy_from_slice(&digest[..OBJECT_ID_LEN]);
        Self(arr)
    }

    /// Create an `ObjectId` from an exact 20-byte fingerprint.
    pub const fn from_raw(raw: [u8; OBJECT_ID_LEN]) -> Self {
        Self(raw)
    }

    /// The null object ID (all zeros). Represents "no object".
    pub const fn null() -> Self {
        Self([0u8; OBJECT_ID_LEN])
    }

    /// Returns `true` if this is the null object ID.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; OBJECT_ID_LEN]
    }

    /// The raw 20-byte fingerprint.
    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    /// Hex-encoded string representation (40 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The first `len` hex digits, clamped to the full length.
    pub fn hex_prefix(&self, len: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(len.min(OBJECT_ID_HEX_LEN));
        hex
    }

    /// Parse from a full 40-digit hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != OBJECT_ID_LEN {
            return Err(TypeError::InvalidLength {
                expected: OBJECT_ID_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; OBJECT_ID_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Returns `true` if `s` looks like a (possibly abbreviated) hex name.
    pub fn is_hex_name(s: &str) -> bool {
        !s.is_empty()
            && s.len() <= OBJECT_ID_HEX_LEN
            && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.hex_prefix(8))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; OBJECT_ID_LEN]> for ObjectId {
    fn from(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectId> for [u8; OBJECT_ID_LEN] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}
