//! Core reference types.

use serde::{Deserialize, Serialize};
use strata_types::ObjectId;

/// A named reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ref {
    /// A mutable pointer to the latest snapshot of a line of work.
    Branch {
        /// Branch name (e.g. "main", "feature/auth").
        name: String,
        /// Fingerprint of the snapshot the branch points at.
        target: ObjectId,
    },

    /// An immutable pointer to a specific snapshot or tree.
    Tag {
        /// Tag name (e.g. "v1.0.0").
        name: String,
        /// Fingerprint of the tagged object.
        target: ObjectId,
    },
}

impl Ref {
    /// Returns the canonical name for this ref (e.g. "refs/heads/main").
    pub fn canonical_name(&self) -> String {
        match self {
            Ref::Branch { name, .. } => format!("refs/heads/{name}"),
            Ref::Tag { name, .. } => format!("refs/tags/{name}"),
        }
    }

    /// Returns the short name of this ref (without the refs/ prefix).
    pub fn short_name(&self) -> &str {
        match self {
            Ref::Branch { name, .. } | Ref::Tag { name, .. } => name,
        }
    }

    /// Returns `true` if this is a tag ref.
    pub fn is_tag(&self) -> bool {
        matches!(self, Ref::Tag { .. })
    }

    /// The fingerprint this ref points to.
    pub fn target(&self) -> ObjectId {
        match self {
            Ref::Branch { target, .. } | Ref::Tag { target, .. } => *target,
        }
    }
}

/// The state of HEAD: either symbolic (pointing to a branch) or detached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Head {
    /// HEAD points to a branch by name.
    Symbolic(String),
    /// HEAD is detached, pointing directly at an object.
    Detached(ObjectId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_and_short_names() {
        let branch = Ref::Branch {
            name: "feature/x".into(),
            target: ObjectId::null(),
        };
        assert_eq!(branch.canonical_name(), "refs/heads/feature/x");
        assert_eq!(branch.short_name(), "feature/x");
        assert!(!branch.is_tag());

        let tag = Ref::Tag {
            name: "v1".into(),
            target: ObjectId::from_bytes(b"t"),
        };
        assert_eq!(tag.canonical_name(), "refs/tags/v1");
        assert_eq!(tag.target(), ObjectId::from_bytes(b"t"));
    }
}
