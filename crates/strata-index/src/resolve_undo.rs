//! Conflict stages remembered for paths whose conflict was resolved.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_store::EntryMode;
use strata_types::ObjectId;

use crate::entry::Stage;

/// The stage 1..3 contents a path had before its conflict was resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveUndoRecord {
    pub path: String,
    stages: [Option<(EntryMode, ObjectId)>; 3],
}

impl ResolveUndoRecord {
    /// A record with no stages yet.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            stages: [None; 3],
        }
    }

    /// Builder: record one conflict stage. Stage 0 is ignored.
    pub fn with_stage(mut self, stage: Stage, mode: EntryMode, id: ObjectId) -> Self {
        if let Some(slot) = (stage.as_u8() as usize).checked_sub(1) {
            self.stages[slot] = Some((mode, id));
        }
        self
    }

    /// The recorded stages in stage order.
    pub fn stages(&self) -> impl Iterator<Item = (Stage, EntryMode, ObjectId)> + '_ {
        [Stage::Base, Stage::Ours, Stage::Theirs]
            .into_iter()
            .zip(self.stages.iter())
            .filter_map(|(stage, slot)| slot.map(|(mode, id)| (stage, mode, id)))
    }
}

/// Resolve-undo records keyed by path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveUndo {
    records: BTreeMap<String, ResolveUndoRecord>,
}

impl ResolveUndo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the record for its path.
    pub fn insert(&mut self, record: ResolveUndoRecord) {
        self.records.insert(record.path.clone(), record);
    }

    pub fn get(&self, path: &str) -> Option<&ResolveUndoRecord> {
        self.records.get(path)
    }

    /// Records in path order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolveUndoRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record whose path does not start with `prefix`.
    pub fn retain_under(&mut self, prefix: &str) {
        self.records.retain(|path, _| path.starts_with(prefix));
    }
}
