//! A repository on disk: work tree root plus its `.strata` directory.

use std::fs;
use std::path::{Path, PathBuf};

use strata_index::{IndexFile, LoadOptions, LoadedIndex};
use strata_refs::{FileRefStore, RefStore};
use strata_store::LooseObjectStore;
use strata_worktree::REPO_DIR_NAME;
use tracing::debug;

use crate::config::RepoConfig;
use crate::error::{LsError, Result};

/// An opened repository.
#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
    repo_dir: PathBuf,
    config: RepoConfig,
    store: LooseObjectStore,
    refs: FileRefStore,
}

impl Repository {
    /// Open the repository whose work tree root is `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let repo_dir = root.join(REPO_DIR_NAME);
        if !repo_dir.is_dir() {
            return Err(LsError::NotARepository(root));
        }
        let config = RepoConfig::load(&repo_dir.join("config.toml"))?;
        Ok(Self {
            store: LooseObjectStore::new(repo_dir.join("objects")),
            refs: FileRefStore::new(&repo_dir),
            root,
            repo_dir,
            config,
        })
    }

    /// Find the repository containing `start`, searching upwards. Returns it
    /// with the `/`-terminated sub-directory `start` names inside the work
    /// tree (empty at the root).
    pub fn discover(start: &Path) -> Result<(Self, String)> {
        let start = start.canonicalize()?;
        let root = start
            .ancestors()
            .find(|dir| dir.join(REPO_DIR_NAME).is_dir())
            .ok_or_else(|| LsError::NotARepository(start.clone()))?;

        let mut prefix = String::new();
        for part in start.strip_prefix(root).into_iter().flat_map(|rel| rel.components()) {
            prefix.push_str(&part.as_os_str().to_string_lossy());
            prefix.push('/');
        }
        debug!(root = %root.display(), prefix = %prefix, "discovered repository");
        Ok((Self::open(root)?, prefix))
    }

    /// Create an empty repository at `root` with `HEAD` on `main`.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let repo_dir = root.join(REPO_DIR_NAME);
        for sub in ["objects", "refs/heads", "refs/tags", "info"] {
            fs::create_dir_all(repo_dir.join(sub))?;
        }
        FileRefStore::new(&repo_dir).set_head("main")?;
        Self::open(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn store(&self) -> &LooseObjectStore {
        &self.store
    }

    pub fn refs(&self) -> &FileRefStore {
        &self.refs
    }

    pub fn index_path(&self) -> PathBuf {
        self.repo_dir.join("index")
    }

    pub fn load_index(&self, opts: &LoadOptions<'_>) -> Result<LoadedIndex> {
        Ok(IndexFile::load(&self.index_path(), opts)?)
    }

    /// The configured user-wide exclude file, anchored at the work tree root
    /// when relative.
    pub fn excludes_file(&self) -> Option<PathBuf> {
        self.config
            .core
            .excludes_file
            .as_ref()
            .map(|p| if p.is_absolute() { p.clone() } else { self.root.join(p) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        assert!(repo.repo_dir().join("objects").is_dir());
        assert!(repo.load_index(&LoadOptions::default()).unwrap().view.is_empty());
        assert!(Repository::open(dir.path()).is_ok());
    }

    #[test]
    fn open_outside_a_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(Repository::open(dir.path()), Err(LsError::NotARepository(_))));
    }

    #[test]
    fn discover_reports_the_sub_directory() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let nested = dir.path().join("src/deep");
        fs::create_dir_all(&nested).unwrap();

        let (repo, prefix) = Repository::discover(&nested).unwrap();
        assert_eq!(prefix, "src/deep/");
        assert_eq!(repo.root(), dir.path().canonicalize().unwrap());

        let (_, prefix) = Repository::discover(dir.path()).unwrap();
        assert_eq!(prefix, "");
    }

    #[test]
    fn relative_excludes_file_is_anchored_at_root() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        fs::write(
            dir.path().join(".strata/config.toml"),
            "[core]\nexcludes_file = \"my-excludes\"\n",
        )
        .unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        assert_eq!(repo.excludes_file(), Some(dir.path().join("my-excludes")));
    }
}
