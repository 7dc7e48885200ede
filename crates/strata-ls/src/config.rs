//! Repository configuration, read from `.strata/config.toml`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LsError, Result};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub core: CoreConfig,
}

/// The `[core]` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// User-wide exclude file, read with `--exclude-standard`. Relative
    /// paths are taken from the work tree root.
    pub excludes_file: Option<PathBuf>,
    /// Name of the per-directory ignore file.
    pub per_directory_ignore: String,
    /// Whether an mtime change alone counts as a modification.
    pub check_mtime: bool,
    /// C-quote unusual paths in newline-terminated output.
    pub quote_path: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            excludes_file: None,
            per_directory_ignore: ".strataignore".into(),
            check_mtime: true,
            quote_path: true,
        }
    }
}

impl RepoConfig {
    /// Load `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text).map_err(|reason| LsError::Config {
                path: path.to_path_buf(),
                reason,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }
}
