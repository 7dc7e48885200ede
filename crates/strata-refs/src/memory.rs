//! In-memory reference store for testing and ephemeral use.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::RefStore;
use crate::types::{Head, Ref};

/// An in-memory implementation of [`RefStore`].
///
/// Data lives in a `BTreeMap` behind a `RwLock` and is lost when the store is
/// dropped.
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    refs: RwLock<BTreeMap<String, Ref>>,
    head: RwLock<Option<Head>>,
}

impl InMemoryRefStore {
    /// Create a new empty ref store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> RefError {
    RefError::Corrupt {
        name: "<memory>".into(),
        reason: format!("lock poisoned: {e}"),
    }
}

impl RefStore for InMemoryRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<Ref>> {
        let refs = self.refs.read().map_err(poisoned)?;
        Ok(refs.get(name).cloned())
    }

    fn write_ref(&self, reference: &Ref) -> Result<()> {
        validate_ref_name(reference.short_name())?;
        let name = reference.canonical_name();

        let mut refs = self.refs.write().map_err(poisoned)?;
        if matches!(refs.get(&name), Some(existing) if existing.is_tag()) {
            return Err(RefError::TagImmutable { name });
        }
        refs.insert(name, reference.clone());
        Ok(())
    }

    fn head(&self) -> Result<Option<Head>> {
        let head = self.head.read().map_err(poisoned)?;
        Ok(head.clone())
    }

    fn set_head(&self, branch: &str) -> Result<()> {
        validate_ref_name(branch)?;
        let mut head = self.head.write().map_err(poisoned)?;
        *head = Some(Head::Symbolic(branch.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_types::ObjectId;

    fn branch(name: &str, seed: &[u8]) -> Ref {
        Ref::Branch {
            name: name.to_string(),
            target: ObjectId::from_bytes(seed),
        }
    }

    #[test]
    fn write_and_read_branch() {
        let store = InMemoryRefStore::new();
        store.write_ref(&branch("main", b"one")).unwrap();

        let read = store.read_ref("refs/heads/main").unwrap().unwrap();
        assert_eq!(read.target(), ObjectId::from_bytes(b"one"));
        assert!(store.read_ref("refs/heads/nope").unwrap().is_none());
    }

    #[test]
    fn branches_move_but_tags_do_not() {
        let store = InMemoryRefStore::new();
        store.write_ref(&branch("main", b"one")).unwrap();
        store.write_ref(&branch("main", b"two")).unwrap();
        assert_eq!(
            store.read_ref("refs/heads/main").unwrap().unwrap().target(),
            ObjectId::from_bytes(b"two")
        );

        let tag = Ref::Tag {
            name: "v1".into(),
            target: ObjectId::from_bytes(b"one"),
        };
        store.write_ref(&tag).unwrap();
        assert!(matches!(store.write_ref(&tag), Err(RefError::TagImmutable { .. })));
    }

    #[test]
    fn head_states() {
        let store = InMemoryRefStore::new();
        assert!(store.head().unwrap().is_none());
        store.set_head("main").unwrap();
        assert_eq!(store.head().unwrap(), Some(Head::Symbolic("main".into())));
        assert!(store.set_head("bad..name").is_err());
    }
}
