//! The reconciliation engine: one run of `ls-files`.
//!
//! A run walks through fixed phases:
//!
//! ```text
//! Init -> Overlaid (with a snapshot) -> Scanned (with others/killed) -> Reported -> Done
//! ```
//!
//! Passes report in a fixed order: others, killed, cached and stage entries,
//! deleted and modified entries, resolve-undo records. A fatal error ends the
//! run; records already emitted stand.

use std::fs;
use std::path::Path;

use strata_index::{is_modified, IndexEntry, IndexView, SnapshotOverlay, Stage, StatOptions, Suppression};
use strata_pathspec::{PathMatcher, Pathspec};
use strata_refs::RefStore;
use strata_store::ObjectStore;
use strata_worktree::{DirectoryEntry, DirectoryScanner, ExclusionOracle, ScanOptions};
use tracing::debug;

use crate::error::{LsError, Result};
use crate::killed::is_killed;
use crate::record::{Record, RecordSink, StageInfo};
use crate::request::LsRequest;
use crate::tag::Tag;

/// The repository pieces a run reads from.
#[derive(Clone, Copy)]
pub struct Workspace<'a> {
    /// Work tree root.
    pub root: &'a Path,
    pub store: &'a dyn ObjectStore,
    pub refs: &'a dyn RefStore,
    pub stat: StatOptions,
}

/// What a finished run reports besides its records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub emitted: usize,
    /// Filters, as the caller wrote them, that matched nothing. Only
    /// collected with strict matching.
    pub unmatched: Vec<String>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.unmatched.is_empty()
    }

    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Init,
    Overlaid,
    Scanned,
    Reported,
    Done,
}

/// Runs the passes of one request against one index.
pub struct ReconciliationEngine<'a> {
    ws: Workspace<'a>,
    request: &'a LsRequest,
    pathspec: &'a Pathspec,
    oracle: Option<&'a ExclusionOracle>,
    matcher: PathMatcher<'a>,
    phase: Phase,
    overlaid: bool,
    emitted: usize,
    last_plain: Option<(String, Tag)>,
}

impl<'a> ReconciliationEngine<'a> {
    /// Prepare a run. `request` must already be normalized; option
    /// combinations that cannot run are rejected here.
    pub fn new(
        ws: Workspace<'a>,
        request: &'a LsRequest,
        pathspec: &'a Pathspec,
        oracle: Option<&'a ExclusionOracle>,
    ) -> Result<Self> {
        request.validate()?;
        if request.ignored && oracle.is_none() {
            return Err(LsError::IgnoredWithoutExcludes);
        }
        Ok(Self {
            ws,
            request,
            pathspec,
            oracle,
            matcher: PathMatcher::new(pathspec, request.error_unmatch),
            phase: Phase::Init,
            overlaid: false,
            emitted: 0,
            last_plain: None,
        })
    }

    fn enter(&mut self, next: Phase) {
        debug!(from = ?self.phase, to = ?next, emitted = self.emitted, "ls-files phase");
        self.phase = next;
    }

    /// Run every selected pass over `index`, emitting into `sink`.
    pub fn run(mut self, mut index: IndexView, sink: &mut dyn RecordSink) -> Result<Outcome> {
        let request = self.request;
        let pathspec = self.pathspec;
        if let Some(name) = &request.with_tree {
            SnapshotOverlay::new(self.ws.store, self.ws.refs).apply(name, pathspec.common_prefix(), &mut index)?;
            self.overlaid = true;
            self.enter(Phase::Overlaid);
        }

        if self.request.needs_scan() {
            let options = ScanOptions {
                show_other_directories: self.request.directory,
                hide_empty_directories: self.request.no_empty_directory,
                show_ignored: self.request.ignored,
            };
            let found: Vec<DirectoryEntry> = DirectoryScanner::new(self.ws.root, pathspec, &index, options)
                .scan(self.oracle)
                .collect();
            self.enter(Phase::Scanned);
            if self.request.others {
                self.others_pass(&found, sink)?;
            }
            if self.request.killed {
                self.killed_pass(&found, &index, sink)?;
            }
        }

        if self.request.cached || self.request.stage {
            self.cached_pass(&index, sink)?;
        }
        if self.request.deleted || self.request.modified {
            self.worktree_pass(&index, sink)?;
        }
        if self.request.resolve_undo {
            self.resolve_undo_pass(&index, sink)?;
        }
        self.enter(Phase::Reported);

        let unmatched = if self.request.error_unmatch {
            self.matcher.unmatched().into_iter().map(String::from).collect()
        } else {
            Vec::new()
        };
        self.enter(Phase::Done);
        Ok(Outcome {
            emitted: self.emitted,
            unmatched,
        })
    }

    // ---------------------------------------------------------------
    // Passes
    // ---------------------------------------------------------------

    fn others_pass(&mut self, found: &[DirectoryEntry], sink: &mut dyn RecordSink) -> Result<()> {
        let before = self.emitted;
        for entry in found {
            if self.matches(&entry.path)? {
                self.emit(sink, Record::new(Tag::Other, entry.path.clone()))?;
            }
        }
        debug!(reported = self.emitted - before, "others pass");
        Ok(())
    }

    fn killed_pass(&mut self, found: &[DirectoryEntry], index: &IndexView, sink: &mut dyn RecordSink) -> Result<()> {
        let before = self.emitted;
        for entry in found {
            if is_killed(entry, index) && self.matches(&entry.path)? {
                self.emit(sink, Record::new(Tag::Killed, entry.path.clone()))?;
            }
        }
        debug!(reported = self.emitted - before, "killed pass");
        Ok(())
    }

    fn cached_pass(&mut self, index: &IndexView, sink: &mut dyn RecordSink) -> Result<()> {
        let pathspec = self.pathspec;
        let before = self.emitted;
        for (pos, entry) in index.iter_under(pathspec.common_prefix()) {
            if !self.ignored_filter(entry) {
                continue;
            }
            if self.request.unmerged && entry.stage.is_merged() {
                continue;
            }
            if index.suppressed(pos) {
                continue;
            }
            let tag = match entry.stage {
                Stage::Merged if entry.flags.skip_worktree => Tag::SkipWorktree,
                Stage::Merged => Tag::Cached,
                // Only the snapshot puts stage-1 entries here; they stand for
                // paths tracked as of that snapshot, not for a conflict.
                Stage::Base if self.overlaid => Tag::Cached,
                _ => Tag::Unmerged,
            };
            let valid_bit = self.request.valid_bit && entry.flags.assume_valid;
            self.emit_index_entry(sink, tag, entry, valid_bit)?;
        }
        debug!(reported = self.emitted - before, "cached pass");
        Ok(())
    }

    fn worktree_pass(&mut self, index: &IndexView, sink: &mut dyn RecordSink) -> Result<()> {
        let pathspec = self.pathspec;
        let before = self.emitted;
        for (pos, entry) in index.iter_under(pathspec.common_prefix()) {
            if !self.ignored_filter(entry) || entry.flags.skip_worktree {
                continue;
            }
            if index.suppression(pos).is_some_and(Suppression::hides_from_worktree) {
                continue;
            }
            // The work tree is compared with what is staged, not with the
            // snapshot's copy of a staged path.
            if self.overlaid && entry.stage == Stage::Base && index.contains_merged(&entry.path) {
                continue;
            }
            let file = self.ws.root.join(&entry.path);
            match fs::symlink_metadata(&file) {
                Err(_) => {
                    if self.request.deleted {
                        self.emit_index_entry(sink, Tag::Removed, entry, false)?;
                    }
                }
                Ok(meta) => {
                    if self.request.modified && is_modified(entry, &file, &meta, &self.ws.stat) {
                        self.emit_index_entry(sink, Tag::Modified, entry, false)?;
                    }
                }
            }
        }
        debug!(reported = self.emitted - before, "deleted/modified pass");
        Ok(())
    }

    fn resolve_undo_pass(&mut self, index: &IndexView, sink: &mut dyn RecordSink) -> Result<()> {
        let pathspec = self.pathspec;
        let prefix = pathspec.common_prefix();
        let before = self.emitted;
        for record in index.resolve_undo().iter() {
            if !record.path.starts_with(prefix) || !self.matches(&record.path)? {
                continue;
            }
            for (stage, mode, id) in record.stages() {
                let out = Record {
                    stage_info: Some(StageInfo { mode, id, stage }),
                    ..Record::new(Tag::ResolveUndo, record.path.clone())
                };
                self.emit(sink, out)?;
            }
        }
        debug!(reported = self.emitted - before, "resolve-undo pass");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    fn matches(&mut self, path: &str) -> Result<bool> {
        Ok(self.matcher.matches(path, self.pathspec.prefix_len())?)
    }

    /// With ignored output, only entries the exclusion rules cover pass.
    fn ignored_filter(&self, entry: &IndexEntry) -> bool {
        if !self.request.ignored {
            return true;
        }
        self.oracle
            .is_some_and(|o| o.is_excluded(&entry.path, entry.mode.is_directory()))
    }

    fn emit_index_entry(
        &mut self,
        sink: &mut dyn RecordSink,
        tag: Tag,
        entry: &IndexEntry,
        valid_bit: bool,
    ) -> Result<()> {
        if !self.matches(&entry.path)? {
            return Ok(());
        }
        let stage_info = self.request.stage.then_some(StageInfo {
            mode: entry.mode,
            id: entry.object_id,
            stage: entry.stage,
        });
        // Without stage columns the stages of a conflicted path print alike.
        if stage_info.is_none() {
            let key = (entry.path.clone(), tag);
            if self.last_plain.as_ref() == Some(&key) {
                return Ok(());
            }
            self.last_plain = Some(key);
        }
        let record = Record {
            tag,
            path: entry.path.clone(),
            stage_info,
            stat: self.request.debug.then_some(entry.stat),
            valid_bit,
        };
        self.emit(sink, record)
    }

    fn emit(&mut self, sink: &mut dyn RecordSink, record: Record) -> Result<()> {
        sink.emit(record)?;
        self.emitted += 1;
        Ok(())
    }
}
