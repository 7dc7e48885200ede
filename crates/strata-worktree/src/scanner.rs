//! One pass over the work tree, yielding untracked paths.

use std::path::{Path, PathBuf};

use strata_index::IndexView;
use strata_pathspec::Pathspec;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::exclude::ExclusionOracle;

/// Name of the repository directory at the work tree root. Never scanned.
pub const REPO_DIR_NAME: &str = ".strata";

/// An untracked path found in the work tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Path relative to the work tree root; directories reported whole end
    /// in `/`.
    pub path: String,
    pub is_dir: bool,
}

/// Scanner behavior switches.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScanOptions {
    /// Report a wholly untracked directory once, as `dir/`, instead of its
    /// contents.
    pub show_other_directories: bool,
    /// With `show_other_directories`, leave out directories holding no files.
    pub hide_empty_directories: bool,
    /// Report only excluded paths instead of skipping them.
    pub show_ignored: bool,
}

/// Configured scan of one work tree.
#[derive(Debug)]
pub struct DirectoryScanner<'a> {
    root: PathBuf,
    pathspec: &'a Pathspec,
    index: &'a IndexView,
    options: ScanOptions,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(root: impl Into<PathBuf>, pathspec: &'a Pathspec, index: &'a IndexView, options: ScanOptions) -> Self {
        Self {
            root: root.into(),
            pathspec,
            index,
            options,
        }
    }

    /// Start the scan. The scanner is consumed, so a second run needs a new
    /// one.
    pub fn scan(self, oracle: Option<&'a ExclusionOracle>) -> Scan<'a> {
        let start = self.root.join(self.pathspec.common_prefix());
        let walker = start
            .is_dir()
            .then(|| WalkDir::new(&start).sort_by_file_name().into_iter());
        debug!(start = %start.display(), "starting directory scan");
        Scan {
            walker,
            root: self.root,
            pathspec: self.pathspec,
            index: self.index,
            oracle,
            options: self.options,
            reported: 0,
        }
    }
}

/// The untracked entries of one scan, in traversal order.
pub struct Scan<'a> {
    walker: Option<walkdir::IntoIter>,
    root: PathBuf,
    pathspec: &'a Pathspec,
    index: &'a IndexView,
    oracle: Option<&'a ExclusionOracle>,
    options: ScanOptions,
    reported: usize,
}

impl Scan<'_> {
    fn excluded(&self, rel: &str, is_dir: bool) -> bool {
        self.oracle.is_some_and(|o| o.is_excluded(rel, is_dir))
    }

    /// Decide what to do with a directory. `Some` reports it whole.
    fn visit_dir(&mut self, rel: String, abs: &Path) -> Option<DirectoryEntry> {
        let walker = self.walker.as_mut()?;
        if rel == REPO_DIR_NAME || !self.pathspec.could_match_dir(&rel) {
            walker.skip_current_dir();
            return None;
        }
        let excluded = self.oracle.is_some_and(|o| o.is_excluded(&rel, true));
        if excluded && !self.options.show_ignored {
            walker.skip_current_dir();
            return None;
        }
        if self.index.has_entries_under(&rel) || !self.options.show_other_directories {
            return None;
        }
        if self.options.show_ignored && !excluded {
            return None;
        }
        walker.skip_current_dir();
        if self.options.hide_empty_directories && !holds_files(abs) {
            return None;
        }
        Some(DirectoryEntry {
            path: format!("{rel}/"),
            is_dir: true,
        })
    }

    fn visit_file(&self, rel: String) -> Option<DirectoryEntry> {
        if !self.index.is_other(&rel) {
            return None;
        }
        if self.excluded(&rel, false) != self.options.show_ignored {
            return None;
        }
        Some(DirectoryEntry {
            path: rel,
            is_dir: false,
        })
    }
}

impl Iterator for Scan<'_> {
    type Item = DirectoryEntry;

    fn next(&mut self) -> Option<DirectoryEntry> {
        loop {
            let next = self.walker.as_mut()?.next();
            let entry = match next {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
                None => {
                    self.walker = None;
                    debug!(reported = self.reported, "directory scan finished");
                    return None;
                }
            };
            if entry.depth() == 0 {
                continue;
            }
            let is_dir = entry.file_type().is_dir();
            let Some(rel) = relative_path(&self.root, entry.path()) else {
                warn!(path = %entry.path().display(), "skipping path that is not valid UTF-8");
                if is_dir {
                    if let Some(walker) = self.walker.as_mut() {
                        walker.skip_current_dir();
                    }
                }
                continue;
            };

            let found = if is_dir {
                self.visit_dir(rel, entry.path())
            } else {
                self.visit_file(rel)
            };
            if let Some(found) = found {
                self.reported += 1;
                return Some(found);
            }
        }
    }
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

fn holds_files(dir: &Path) -> bool {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|e| !e.file_type().is_dir())
}
