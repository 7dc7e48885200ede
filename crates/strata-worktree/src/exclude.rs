//! Exclusion rules: which untracked paths are ignored.
//!
//! Rules come from four sources, consulted in this order (the first source
//! with an opinion decides):
//!
//! 1. patterns given on the command line;
//! 2. per-directory ignore files, deepest directory first;
//! 3. exclude files given on the command line, later files first;
//! 4. the standard files: `info/exclude` in the repository directory and the
//!    configured `core.excludes_file`.
//!
//! A path inside an excluded directory is excluded regardless of its own
//! rules.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use tracing::{debug, warn};

use crate::error::{Result, WorktreeError};

/// Where exclusion rules come from.
#[derive(Clone, Debug, Default)]
pub struct ExcludeSources {
    /// Patterns given directly (`-x`).
    pub patterns: Vec<String>,
    /// Exclude files given directly (`-X`). Missing files are an error.
    pub from_files: Vec<PathBuf>,
    /// Name of the per-directory ignore file.
    pub per_directory: Option<String>,
    /// Also read `info/exclude` and `excludes_file`.
    pub standard: bool,
    /// The user-wide exclude file, read when `standard` is set.
    pub excludes_file: Option<PathBuf>,
}

impl ExcludeSources {
    /// Returns `true` when no source is configured at all.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
            && self.from_files.is_empty()
            && self.per_directory.is_none()
            && !self.standard
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Verdict {
    Excluded,
    Included,
    Undecided,
}

impl<T> From<Match<T>> for Verdict {
    fn from(m: Match<T>) -> Self {
        match m {
            Match::Ignore(_) => Verdict::Excluded,
            Match::Whitelist(_) => Verdict::Included,
            Match::None => Verdict::Undecided,
        }
    }
}

/// Compiled exclusion rules for one work tree.
#[derive(Debug)]
pub struct ExclusionOracle {
    root: PathBuf,
    command_line: Option<Gitignore>,
    per_directory: Option<String>,
    dir_rules: RefCell<HashMap<String, Option<Gitignore>>>,
    files: Vec<Gitignore>,
}

impl ExclusionOracle {
    /// Compile `sources` for the work tree at `root` whose repository
    /// directory is `repo_dir`.
    pub fn compile(sources: &ExcludeSources, root: &Path, repo_dir: &Path) -> Result<Self> {
        let command_line = if sources.patterns.is_empty() {
            None
        } else {
            let mut builder = GitignoreBuilder::new(root);
            for pattern in &sources.patterns {
                builder
                    .add_line(None, pattern)
                    .map_err(|e| WorktreeError::InvalidPattern {
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })?;
            }
            Some(builder.build().map_err(|e| WorktreeError::InvalidPattern {
                pattern: sources.patterns.join(" "),
                reason: e.to_string(),
            })?)
        };

        let mut files = Vec::new();
        for path in sources.from_files.iter().rev() {
            if !path.is_file() {
                return Err(WorktreeError::ExcludeFile {
                    path: path.clone(),
                    reason: "not a readable file".into(),
                });
            }
            files.push(build_file_rules(root, path).map_err(|reason| WorktreeError::ExcludeFile {
                path: path.clone(),
                reason,
            })?);
        }
        if sources.standard {
            let standard = std::iter::once(repo_dir.join("info").join("exclude"))
                .chain(sources.excludes_file.iter().cloned());
            for path in standard.filter(|p| p.is_file()) {
                match build_file_rules(root, &path) {
                    Ok(rules) => files.push(rules),
                    Err(reason) => warn!(path = %path.display(), %reason, "skipping exclude file"),
                }
            }
        }

        debug!(
            patterns = sources.patterns.len(),
            files = files.len(),
            per_directory = ?sources.per_directory,
            "compiled exclusion rules"
        );
        Ok(Self {
            root: root.to_path_buf(),
            command_line,
            per_directory: sources.per_directory.clone(),
            dir_rules: RefCell::new(HashMap::new()),
            files,
        })
    }

    /// Whether `path` (relative to the work tree root, `/`-separated) is
    /// excluded. A trailing `/` marks a directory.
    pub fn is_excluded(&self, path: &str, is_dir: bool) -> bool {
        let is_dir = is_dir || path.ends_with('/');
        let path = path.trim_end_matches('/');
        let parent_excluded = path
            .match_indices('/')
            .any(|(slash, _)| self.verdict(&path[..slash], true) == Verdict::Excluded);
        parent_excluded || self.verdict(path, is_dir) == Verdict::Excluded
    }

    fn verdict(&self, path: &str, is_dir: bool) -> Verdict {
        if let Some(rules) = &self.command_line {
            let v = Verdict::from(rules.matched(path, is_dir));
            if v != Verdict::Undecided {
                return v;
            }
        }
        let v = self.per_directory_verdict(path, is_dir);
        if v != Verdict::Undecided {
            return v;
        }
        self.files
            .iter()
            .map(|rules| Verdict::from(rules.matched(path, is_dir)))
            .find(|v| *v != Verdict::Undecided)
            .unwrap_or(Verdict::Undecided)
    }

    fn per_directory_verdict(&self, path: &str, is_dir: bool) -> Verdict {
        let Some(name) = &self.per_directory else {
            return Verdict::Undecided;
        };
        let mut dirs: Vec<&str> = path.match_indices('/').map(|(i, _)| &path[..i]).collect();
        dirs.reverse();
        dirs.push("");

        let mut cache = self.dir_rules.borrow_mut();
        for dir in dirs {
            let rel = if dir.is_empty() { path } else { &path[dir.len() + 1..] };
            let rules = cache
                .entry(dir.to_string())
                .or_insert_with(|| load_dir_rules(&self.root, dir, name));
            if let Some(rules) = rules {
                let v = Verdict::from(rules.matched(rel, is_dir));
                if v != Verdict::Undecided {
                    return v;
                }
            }
        }
        Verdict::Undecided
    }
}

fn build_file_rules(root: &Path, path: &Path) -> std::result::Result<Gitignore, String> {
    let mut builder = GitignoreBuilder::new(root);
    if let Some(err) = builder.add(path) {
        warn!(path = %path.display(), error = %err, "problem reading exclude file");
    }
    builder.build().map_err(|e| e.to_string())
}

fn load_dir_rules(root: &Path, dir: &str, name: &str) -> Option<Gitignore> {
    let base = root.join(dir);
    let file = base.join(name);
    if !file.is_file() {
        return None;
    }
    let mut builder = GitignoreBuilder::new(&base);
    if let Some(err) = builder.add(&file) {
        warn!(path = %file.display(), error = %err, "problem reading ignore file");
    }
    match builder.build() {
        Ok(rules) => Some(rules),
        Err(e) => {
            warn!(path = %file.display(), error = %e, "skipping ignore file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Tree {
        dir: tempfile::TempDir,
    }

    impl Tree {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            fs::create_dir_all(dir.path().join(".strata/info")).unwrap();
            Self { dir }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn repo_dir(&self) -> PathBuf {
            self.root().join(".strata")
        }

        fn write(&self, rel: &str, content: &str) {
            let path = self.root().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn oracle(&self, sources: &ExcludeSources) -> ExclusionOracle {
            ExclusionOracle::compile(sources, self.root(), &self.repo_dir()).unwrap()
        }
    }

    #[test]
    fn command_line_patterns() {
        let t = Tree::new();
        let oracle = t.oracle(&ExcludeSources {
            patterns: vec!["*.o".into(), "build/".into()],
            ..Default::default()
        });
        assert!(oracle.is_excluded("main.o", false));
        assert!(oracle.is_excluded("deep/main.o", false));
        assert!(oracle.is_excluded("build", true));
        assert!(!oracle.is_excluded("build", false));
        assert!(oracle.is_excluded("build/out.txt", false));
        assert!(!oracle.is_excluded("main.c", false));
    }

    #[test]
    fn deeper_ignore_file_wins() {
        let t = Tree::new();
        t.write(".strataignore", "*.log\n");
        t.write("keep/.strataignore", "!*.log\n");
        let oracle = t.oracle(&ExcludeSources {
            per_directory: Some(".strataignore".into()),
            ..Default::default()
        });
        assert!(oracle.is_excluded("top.log", false));
        assert!(oracle.is_excluded("other/x.log", false));
        assert!(!oracle.is_excluded("keep/x.log", false));
    }

    #[test]
    fn command_line_overrides_ignore_files() {
        let t = Tree::new();
        t.write(".strataignore", "*.tmp\n");
        let oracle = t.oracle(&ExcludeSources {
            patterns: vec!["!important.tmp".into()],
            per_directory: Some(".strataignore".into()),
            ..Default::default()
        });
        assert!(oracle.is_excluded("scratch.tmp", false));
        assert!(!oracle.is_excluded("important.tmp", false));
    }

    #[test]
    fn standard_sources() {
        let t = Tree::new();
        t.write(".strata/info/exclude", "secret\n");
        t.write("home-excludes", "*.swp\n");
        let oracle = t.oracle(&ExcludeSources {
            standard: true,
            excludes_file: Some(t.root().join("home-excludes")),
            ..Default::default()
        });
        assert!(oracle.is_excluded("secret", false));
        assert!(oracle.is_excluded("notes.swp", false));
        assert!(!oracle.is_excluded("notes.txt", false));
    }

    #[test]
    fn exclude_file_from_command_line() {
        let t = Tree::new();
        t.write("rules", "generated/\n");
        let oracle = t.oracle(&ExcludeSources {
            from_files: vec![t.root().join("rules")],
            ..Default::default()
        });
        assert!(oracle.is_excluded("generated/", false));
        assert!(oracle.is_excluded("generated/a.rs", false));

        let missing = ExclusionOracle::compile(
            &ExcludeSources {
                from_files: vec![t.root().join("no-such-file")],
                ..Default::default()
            },
            t.root(),
            &t.repo_dir(),
        );
        assert!(matches!(missing, Err(WorktreeError::ExcludeFile { .. })));
    }

    #[test]
    fn empty_sources() {
        assert!(ExcludeSources::default().is_empty());
        assert!(!ExcludeSources {
            standard: true,
            ..Default::default()
        }
        .is_empty());
    }
}
