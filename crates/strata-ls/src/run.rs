//! One `ls-files` invocation against a repository on disk.

use std::io::Write;

use strata_index::{LoadOptions, StatOptions};
use strata_pathspec::Pathspec;
use strata_worktree::{ExcludeSources, ExclusionOracle};
use tracing::debug;

use crate::engine::{Outcome, ReconciliationEngine, Workspace};
use crate::error::Result;
use crate::record::{OutputFormat, RecordWriter};
use crate::repo::Repository;
use crate::request::LsRequest;

/// List paths of `repo` for a caller in sub-directory `cwd_prefix`, writing
/// rendered records to `out`.
pub fn run<W: Write>(repo: &Repository, cwd_prefix: &str, request: LsRequest, out: W) -> Result<Outcome> {
    let request = request.normalized();
    request.validate()?;

    // Without filters, a caller in a sub-directory sees only that directory.
    let pathspec = if request.paths.is_empty() && !cwd_prefix.is_empty() {
        Pathspec::new(cwd_prefix, &["."])?
    } else {
        Pathspec::new(cwd_prefix, &request.paths)?
    };
    let loaded = repo.load_index(&LoadOptions {
        pathspec: Some(&pathspec),
        resolve_undo: request.resolve_undo,
    })?;

    let sources = exclude_sources(repo, &request.excludes);
    let oracle = if sources.is_empty() {
        None
    } else {
        Some(ExclusionOracle::compile(&sources, repo.root(), repo.repo_dir())?)
    };

    let core = &repo.config().core;
    let ws = Workspace {
        root: repo.root(),
        store: repo.store(),
        refs: repo.refs(),
        stat: StatOptions {
            check_mtime: core.check_mtime,
        },
    };
    let format = OutputFormat::for_request(&request, cwd_prefix, core.quote_path);
    let mut writer = RecordWriter::new(out, format, repo.store());

    debug!(
        prefix = %loaded.prefix,
        entries = loaded.view.len(),
        filters = pathspec.len(),
        "running ls-files"
    );
    let engine = ReconciliationEngine::new(ws, &request, &pathspec, oracle.as_ref())?;
    let mut outcome = engine.run(loaded.view, &mut writer)?;
    writer.into_inner().flush()?;
    if request.paths.is_empty() {
        outcome.unmatched.clear();
    }
    Ok(outcome)
}

/// Fill in what `--exclude-standard` means for this repository.
fn exclude_sources(repo: &Repository, given: &ExcludeSources) -> ExcludeSources {
    let mut sources = given.clone();
    if sources.standard {
        sources.excludes_file = repo.excludes_file();
        if sources.per_directory.is_none() {
            sources.per_directory = Some(repo.config().core.per_directory_ignore.clone());
        }
    }
    sources
}
