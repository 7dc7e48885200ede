//! The immutable description of one listing run.

use strata_worktree::ExcludeSources;

use crate::error::{LsError, Result};

/// Byte written after every record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Terminator {
    #[default]
    Newline,
    Nul,
}

impl Terminator {
    pub fn as_byte(self) -> u8 {
        match self {
            Terminator::Newline => b'\n',
            Terminator::Nul => b'\0',
        }
    }
}

/// Everything a caller asked for. Built once, then only read.
#[derive(Clone, Debug, Default)]
pub struct LsRequest {
    pub cached: bool,
    pub deleted: bool,
    pub modified: bool,
    pub others: bool,
    pub ignored: bool,
    pub stage: bool,
    pub killed: bool,
    pub unmerged: bool,
    pub resolve_undo: bool,

    /// Prefix every record with a two-character status tag.
    pub tag_output: bool,
    /// Like `tag_output`, with lowercase tags for `assume_valid` entries.
    pub valid_bit: bool,

    /// Snapshot to overlay onto the index before listing.
    pub with_tree: Option<String>,
    /// Every filter must match at least one reported path.
    pub error_unmatch: bool,
    /// Minimum length of abbreviated fingerprints; `None` prints them whole.
    pub abbrev: Option<usize>,

    /// Report wholly untracked directories as `dir/`.
    pub directory: bool,
    pub no_empty_directory: bool,

    pub terminator: Terminator,
    /// Print paths relative to the work tree root, not the caller's
    /// sub-directory.
    pub full_name: bool,
    /// Print cached stat data after each index record.
    pub debug: bool,

    /// Command-line exclusion inputs.
    pub excludes: ExcludeSources,

    /// Path filters as given.
    pub paths: Vec<String>,
}

impl LsRequest {
    /// Apply the implied selections: nothing selected lists cached entries,
    /// and unmerged output implies stage output.
    pub fn normalized(mut self) -> Self {
        let selected = self.cached
            || self.deleted
            || self.modified
            || self.others
            || self.stage
            || self.killed
            || self.unmerged
            || self.resolve_undo;
        if !selected {
            self.cached = true;
        }
        if self.unmerged {
            self.stage = true;
        }
        self
    }

    /// Reject option combinations that cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.with_tree.is_some() && (self.stage || self.unmerged) {
            return Err(LsError::IncompatibleOptions(
                "--with-tree cannot be used with --stage or --unmerged".into(),
            ));
        }
        if self.ignored && self.excludes.is_empty() {
            return Err(LsError::IgnoredWithoutExcludes);
        }
        Ok(())
    }

    /// Whether status tags are printed.
    pub fn shows_tags(&self) -> bool {
        self.tag_output || self.valid_bit
    }

    /// Whether any pass reads the work tree scan.
    pub fn needs_scan(&self) -> bool {
        self.others || self.killed
    }
}
