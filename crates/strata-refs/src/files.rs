//! File-backed reference store.
//!
//! Layout under the repository directory:
//!
//! - `HEAD` containing either `ref: refs/heads/<branch>` or a hex fingerprint
//! - `refs/heads/<branch>` and `refs/tags/<tag>`, each holding one hex
//!   fingerprint followed by a newline

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use strata_types::ObjectId;

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::RefStore;
use crate::types::{Head, Ref};

const SYMREF_PREFIX: &str = "ref: refs/heads/";

/// [`RefStore`] reading and writing plain files under a repository directory.
#[derive(Debug, Clone)]
pub struct FileRefStore {
    dir: PathBuf,
}

impl FileRefStore {
    /// Open the ref store rooted at the repository directory (e.g. `.strata`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_file(&self, rel: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.dir.join(rel)) {
            Ok(s) => Ok(Some(s.trim_end().to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&self, rel: &str, contents: &str) -> Result<()> {
        let path = self.dir.join(rel);
        let parent = path.parent().unwrap_or(&self.dir);
        fs::create_dir_all(parent)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        writeln!(tmp, "{contents}")?;
        tmp.persist(&path).map_err(|e| RefError::Io(e.error))?;
        Ok(())
    }

    fn parse_target(name: &str, contents: &str) -> Result<ObjectId> {
        ObjectId::from_hex(contents).map_err(|e| RefError::Corrupt {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    fn ref_from_canonical(name: &str, target: ObjectId) -> Option<Ref> {
        if let Some(short) = name.strip_prefix("refs/heads/") {
            Some(Ref::Branch {
                name: short.to_string(),
                target,
            })
        } else {
            name.strip_prefix("refs/tags/").map(|short| Ref::Tag {
                name: short.to_string(),
                target,
            })
        }
    }
}

impl RefStore for FileRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<Ref>> {
        let Some(contents) = self.read_file(name)? else {
            return Ok(None);
        };
        let target = Self::parse_target(name, &contents)?;
        Ok(Self::ref_from_canonical(name, target))
    }

    fn write_ref(&self, reference: &Ref) -> Result<()> {
        validate_ref_name(reference.short_name())?;
        let name = reference.canonical_name();
        if reference.is_tag() && self.dir.join(&name).is_file() {
            return Err(RefError::TagImmutable { name });
        }
        self.write_file(&name, &reference.target().to_hex())
    }

    fn head(&self) -> Result<Option<Head>> {
        let Some(contents) = self.read_file("HEAD")? else {
            return Ok(None);
        };
        match contents.strip_prefix(SYMREF_PREFIX) {
            Some(branch) => Ok(Some(Head::Symbolic(branch.to_string()))),
            None => Ok(Some(Head::Detached(Self::parse_target("HEAD", &contents)?))),
        }
    }

    fn set_head(&self, branch: &str) -> Result<()> {
        validate_ref_name(branch)?;
        self.write_file("HEAD", &format!("{SYMREF_PREFIX}{branch}"))
    }
}
