//! The in-memory staged index.
//!
//! [`IndexView`] keeps entries sorted by path and then by stage. Entries are
//! never removed by readers; an entry that should not be reported on its own
//! is recorded in a side map of [`Suppression`] reasons keyed by its position.

use std::collections::BTreeMap;

use strata_store::{EntryMode, ObjectStore, Tree};
use strata_types::ObjectId;
use tracing::debug;

use crate::entry::{IndexEntry, Stage};
use crate::error::{IndexError, IndexResult};
use crate::resolve_undo::ResolveUndo;

/// Why an entry is skipped when reporting staged content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Suppression {
    /// A stage-1 entry read from a snapshot shadows this stage-0 entry.
    SupersededBySnapshot,
    /// Hoisting left several stage-3 entries for one path; only the first
    /// is reported.
    HoistedDuplicate,
    /// A stage-1 entry read from a snapshot for a path the index holds in
    /// conflict. The conflict is reported instead.
    ConflictedInIndex,
}

impl Suppression {
    /// Whether the entry is also left out of work-tree probes. A superseded
    /// stage-0 entry still describes what is staged, so its file is probed.
    pub fn hides_from_worktree(self) -> bool {
        self != Suppression::SupersededBySnapshot
    }
}

/// How a candidate path collides with tracked paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collision {
    None,
    /// A directory-level entry sits on a leading component of the candidate.
    FileBlocksDirectory,
    /// Tracked paths exist beneath the candidate.
    DirectoryBlocksFile,
}

/// The staged index, sorted and stage-aware.
#[derive(Clone, Debug, Default)]
pub struct IndexView {
    entries: Vec<IndexEntry>,
    suppressed: BTreeMap<usize, Suppression>,
    resolve_undo: ResolveUndo,
}

impl IndexView {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from entries in any order.
    ///
    /// Fails with [`IndexError::DuplicateEntry`] when two entries share both
    /// path and stage.
    pub fn from_entries(mut entries: Vec<IndexEntry>) -> IndexResult<Self> {
        entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        if let Some(pair) = entries.windows(2).find(|w| w[0].sort_key() == w[1].sort_key()) {
            return Err(IndexError::DuplicateEntry {
                path: pair[1].path.clone(),
                stage: pair[1].stage,
            });
        }
        Ok(Self {
            entries,
            ..Self::default()
        })
    }

    /// Builder: attach resolve-undo records.
    pub fn with_resolve_undo(mut self, resolve_undo: ResolveUndo) -> Self {
        self.resolve_undo = resolve_undo;
        self
    }

    /// Number of entries, suppressed ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// The entry at `pos`.
    pub fn get(&self, pos: usize) -> Option<&IndexEntry> {
        self.entries.get(pos)
    }

    /// Resolve-undo records kept at load time.
    pub fn resolve_undo(&self) -> &ResolveUndo {
        &self.resolve_undo
    }

    // ---------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------

    /// Position of the first entry whose path sorts at or after `path`.
    pub fn first_at_or_after(&self, path: &str) -> usize {
        self.entries.partition_point(|e| e.path.as_str() < path)
    }

    /// Position of the entry at `path` and `stage`.
    pub fn position(&self, path: &str, stage: Stage) -> Option<usize> {
        self.entries
            .binary_search_by(|e| e.sort_key().cmp(&(path, stage)))
            .ok()
    }

    /// Whether any stage of `path` is tracked.
    pub fn contains_path(&self, path: &str) -> bool {
        self.entries
            .get(self.first_at_or_after(path))
            .is_some_and(|e| e.path == path)
    }

    /// Whether `path` is tracked at stage 0.
    pub fn contains_merged(&self, path: &str) -> bool {
        self.position(path, Stage::Merged).is_some()
    }

    /// Whether `path` is absent at every stage.
    pub fn is_other(&self, path: &str) -> bool {
        !self.contains_path(path)
    }

    /// Whether any tracked path lies beneath directory `dir`.
    pub fn has_entries_under(&self, dir: &str) -> bool {
        let dir = dir.trim_end_matches('/');
        if dir.is_empty() {
            return !self.entries.is_empty();
        }
        let prefix = format!("{dir}/");
        self.entries
            .get(self.first_at_or_after(&prefix))
            .is_some_and(|e| e.path.starts_with(&prefix))
    }

    /// Entries whose path starts with `prefix`, with their positions.
    pub fn iter_under<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (usize, &'a IndexEntry)> + 'a {
        let start = self.first_at_or_after(prefix);
        self.entries[start..]
            .iter()
            .enumerate()
            .map(move |(i, e)| (start + i, e))
            .take_while(move |(_, e)| e.path.starts_with(prefix))
    }

    /// Classify how `candidate` (a path, optionally with a trailing `/`)
    /// collides with tracked paths. Stages and suppression are ignored.
    pub fn collision(&self, candidate: &str) -> Collision {
        let name = candidate.trim_end_matches('/');
        for (slash, _) in name.match_indices('/') {
            let leading = &name[..slash];
            let start = self.first_at_or_after(leading);
            let blocked = self.entries[start..]
                .iter()
                .take_while(|e| e.path == leading)
                .any(|e| e.mode == EntryMode::Directory);
            if blocked {
                return Collision::FileBlocksDirectory;
            }
        }
        if self.has_entries_under(name) {
            Collision::DirectoryBlocksFile
        } else {
            Collision::None
        }
    }

    // ---------------------------------------------------------------
    // Suppression
    // ---------------------------------------------------------------

    /// Why the entry at `pos` is suppressed, if it is.
    pub fn suppression(&self, pos: usize) -> Option<Suppression> {
        self.suppressed.get(&pos).copied()
    }

    /// Whether the entry at `pos` is suppressed.
    pub fn suppressed(&self, pos: usize) -> bool {
        self.suppressed.contains_key(&pos)
    }

    pub(crate) fn suppress(&mut self, pos: usize, reason: Suppression) {
        self.suppressed.insert(pos, reason);
    }

    // ---------------------------------------------------------------
    // Mutation (overlay only)
    // ---------------------------------------------------------------

    /// Relabel every unmerged entry to stage 3. Returns how many moved.
    pub(crate) fn hoist_unmerged(&mut self) -> usize {
        let mut hoisted = 0;
        for entry in &mut self.entries {
            if !entry.stage.is_merged() && entry.stage != Stage::Theirs {
                entry.stage = Stage::Theirs;
                hoisted += 1;
            }
        }
        if hoisted > 0 {
            self.resort();
        }
        hoisted
    }

    /// Stable re-sort that carries suppression markers along.
    fn resort(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        let mut tagged: Vec<(IndexEntry, Option<Suppression>)> = entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| (e, self.suppressed.get(&i).copied()))
            .collect();
        tagged.sort_by(|a, b| a.0.sort_key().cmp(&b.0.sort_key()));

        self.suppressed.clear();
        self.entries.reserve(tagged.len());
        for (i, (entry, reason)) in tagged.into_iter().enumerate() {
            if let Some(reason) = reason {
                self.suppressed.insert(i, reason);
            }
            self.entries.push(entry);
        }
    }

    /// Read tree `tree_id` recursively into the index at `stage`, keeping
    /// only paths that start with the literal `prefix`.
    ///
    /// An existing entry at the same path and stage is replaced. Returns the
    /// number of entries read.
    pub fn read_tree(
        &mut self,
        store: &dyn ObjectStore,
        tree_id: &ObjectId,
        stage: Stage,
        prefix: &str,
    ) -> IndexResult<usize> {
        let mut read = Vec::new();
        collect_tree(store, tree_id, "", stage, prefix, &mut read)?;

        let count = read.len();
        let mut fresh = Vec::new();
        for entry in read {
            match self.position(&entry.path, entry.stage) {
                Some(pos) => self.entries[pos] = entry,
                None => fresh.push(entry),
            }
        }
        if !fresh.is_empty() {
            self.entries.extend(fresh);
            self.resort();
        }
        debug!(tree = %tree_id, stage = %stage, prefix, count, "read tree into index");
        Ok(count)
    }
}

fn collect_tree(
    store: &dyn ObjectStore,
    tree_id: &ObjectId,
    base: &str,
    stage: Stage,
    prefix: &str,
    out: &mut Vec<IndexEntry>,
) -> IndexResult<()> {
    let stored = store
        .read(tree_id)?
        .ok_or(IndexError::ObjectNotFound(*tree_id))?;
    let tree = Tree::from_stored_object(&stored)?;
    for te in &tree.entries {
        let path = format!("{base}{}", te.name);
        if te.mode.is_directory() {
            let dir = format!("{path}/");
            if dir.starts_with(prefix) || prefix.starts_with(&dir) {
                collect_tree(store, &te.object_id, &dir, stage, prefix, out)?;
            }
        } else if path.starts_with(prefix) {
            out.push(IndexEntry::new(path, te.object_id, te.mode).with_stage(stage));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_store::{Blob, InMemoryObjectStore, TreeEntry};

    fn entry(path: &str, stage: Stage) -> IndexEntry {
        IndexEntry::new(path, ObjectId::from_bytes(path.as_bytes()), EntryMode::Regular)
            .with_stage(stage)
    }

    fn view(paths: &[&str]) -> IndexView {
        IndexView::from_entries(paths.iter().map(|p| entry(p, Stage::Merged)).collect()).unwrap()
    }

    #[test]
    fn from_entries_sorts_and_rejects_duplicates() {
        let v = view(&["b", "a/x", "a"]);
        let paths: Vec<&str> = v.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "a/x", "b"]);

        let err = IndexView::from_entries(vec![entry("a", Stage::Merged), entry("a", Stage::Merged)])
            .unwrap_err();
        assert!(matches!(err, IndexError::DuplicateEntry { stage: Stage::Merged, .. }));

        let conflict = IndexView::from_entries(vec![
            entry("c", Stage::Theirs),
            entry("c", Stage::Base),
            entry("c", Stage::Ours),
        ])
        .unwrap();
        assert_eq!(conflict.len(), 3);
        assert_eq!(conflict.entries()[0].stage, Stage::Base);
    }

    #[test]
    fn lookups() {
        let v = view(&["a", "dir/file", "z"]);
        assert_eq!(v.first_at_or_after("b"), 1);
        assert_eq!(v.first_at_or_after("zz"), 3);
        assert_eq!(v.position("dir/file", Stage::Merged), Some(1));
        assert_eq!(v.position("dir/file", Stage::Ours), None);
        assert!(v.contains_merged("a"));
        assert!(v.is_other("dir"));
        assert!(v.has_entries_under("dir"));
        assert!(v.has_entries_under("dir/"));
        assert!(!v.has_entries_under("a"));
    }

    #[test]
    fn iter_under_prefix() {
        let v = view(&["a", "src/a.rs", "src/b.rs", "srcx"]);
        let under: Vec<(usize, &str)> = v
            .iter_under("src/")
            .map(|(i, e)| (i, e.path.as_str()))
            .collect();
        assert_eq!(under, vec![(1, "src/a.rs"), (2, "src/b.rs")]);
        assert_eq!(v.iter_under("").count(), 4);
    }

    #[test]
    fn collision_kinds() {
        let mut entries = vec![entry("a/b", Stage::Merged), entry("f", Stage::Merged)];
        entries.push(IndexEntry::new("sub", ObjectId::null(), EntryMode::Directory));
        let v = IndexView::from_entries(entries).unwrap();

        assert_eq!(v.collision("a"), Collision::DirectoryBlocksFile);
        assert_eq!(v.collision("f/x"), Collision::None);
        assert_eq!(v.collision("sub/x"), Collision::FileBlocksDirectory);
        assert_eq!(v.collision("elsewhere"), Collision::None);
    }

    #[test]
    fn hoist_keeps_duplicates_in_original_order() {
        let mut v = IndexView::from_entries(vec![
            entry("c", Stage::Base),
            entry("c", Stage::Ours),
            entry("c", Stage::Theirs),
            entry("d", Stage::Merged),
        ])
        .unwrap();
        assert_eq!(v.hoist_unmerged(), 2);
        let stages: Vec<Stage> = v.entries().iter().map(|e| e.stage).collect();
        assert_eq!(stages, vec![Stage::Theirs, Stage::Theirs, Stage::Theirs, Stage::Merged]);
        assert_eq!(v.entries()[0].object_id, ObjectId::from_bytes(b"c"));
    }

    #[test]
    fn resort_carries_suppression() {
        let mut v = view(&["b", "d"]);
        v.suppress(1, Suppression::SupersededBySnapshot);
        v.entries.push(entry("a", Stage::Merged));
        v.resort();
        assert_eq!(v.entries()[2].path, "d");
        assert_eq!(v.suppression(2), Some(Suppression::SupersededBySnapshot));
        assert!(!v.suppressed(1));
    }

    #[test]
    fn read_tree_recurses_and_respects_prefix() {
        let store = InMemoryObjectStore::new();
        let blob = store
            .write(&Blob::new(b"x".to_vec()).to_stored_object())
            .unwrap();
        let sub = store
            .write(
                &Tree::new(vec![TreeEntry::new(EntryMode::Regular, "inner", blob)])
                    .to_stored_object()
                    .unwrap(),
            )
            .unwrap();
        let root = store
            .write(
                &Tree::new(vec![
                    TreeEntry::new(EntryMode::Regular, "top", blob),
                    TreeEntry::new(EntryMode::Directory, "sub", sub),
                ])
                .to_stored_object()
                .unwrap(),
            )
            .unwrap();

        let mut all = IndexView::new();
        assert_eq!(all.read_tree(&store, &root, Stage::Base, "").unwrap(), 2);
        let paths: Vec<&str> = all.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["sub/inner", "top"]);
        assert!(all.entries().iter().all(|e| e.stage == Stage::Base));

        let mut some = view(&["sub/inner"]);
        assert_eq!(some.read_tree(&store, &root, Stage::Base, "sub/").unwrap(), 1);
        assert_eq!(some.len(), 2);
        assert_eq!(some.position("sub/inner", Stage::Base), Some(1));
    }

    #[test]
    fn read_tree_missing_object() {
        let store = InMemoryObjectStore::new();
        let mut v = IndexView::new();
        let missing = ObjectId::from_bytes(b"missing");
        assert!(matches!(
            v.read_tree(&store, &missing, Stage::Base, ""),
            Err(IndexError::ObjectNotFound(_))
        ));
    }

    proptest::proptest! {
        #[test]
        fn iter_under_yields_exactly_the_prefixed_entries(
            paths in proptest::collection::btree_set("[ab]{1,2}(/[ab]{1,2}){0,2}", 0..12),
            prefix in "([ab]{1,2}/){0,2}",
        ) {
            let v = IndexView::from_entries(paths.iter().map(|p| entry(p, Stage::Merged)).collect()).unwrap();
            let under: Vec<&str> = v.iter_under(&prefix).map(|(_, e)| e.path.as_str()).collect();
            let expected: Vec<&str> = paths.iter().map(String::as_str).filter(|p| p.starts_with(&prefix)).collect();
            proptest::prop_assert_eq!(under, expected);
            for (pos, e) in v.iter_under(&prefix) {
                proptest::prop_assert_eq!(v.position(&e.path, e.stage), Some(pos));
            }
        }
    }
}
