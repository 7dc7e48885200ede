//! Foundation types for strata.
//!
//! Every other strata crate depends on `strata-types` for the content
//! fingerprint that names blobs, trees and snapshots.
//!
//! # Key Types
//!
//! - [`ObjectId`]: 20-byte content fingerprint (truncated BLAKE3)
//! - [`ContentHasher`]: Domain-separated hasher producing [`ObjectId`]s

pub mod error;
pub mod hasher;
pub mod object;

pub use error::TypeError;
pub use hasher::ContentHasher;
pub use object::{ObjectId, OBJECT_ID_HEX_LEN, OBJECT_ID_LEN};
