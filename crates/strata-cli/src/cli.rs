use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use strata_ls::{LsRequest, Terminator};
use strata_worktree::ExcludeSources;

#[derive(Parser)]
#[command(name = "strata", about = "Inspect the staged index and working tree of a strata repository", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log what each phase does to stderr
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty repository
    Init(InitArgs),
    /// Show information about files in the index and the working tree
    LsFiles(LsFilesArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Work tree root (defaults to the current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct LsFilesArgs {
    /// Terminate records with NUL instead of newline; paths are not quoted
    #[arg(short = 'z')]
    pub nul: bool,
    /// Prefix each record with a status tag
    #[arg(short = 't')]
    pub tags: bool,
    /// Like -t, with lowercase tags for entries assumed unchanged
    #[arg(short = 'v')]
    pub valid_bit: bool,

    /// Show cached files (the default)
    #[arg(short, long)]
    pub cached: bool,
    /// Show files missing from the working tree
    #[arg(short, long)]
    pub deleted: bool,
    /// Show files whose working-tree copy differs from the index
    #[arg(short, long)]
    pub modified: bool,
    /// Show untracked files
    #[arg(short, long)]
    pub others: bool,
    /// Show only ignored files
    #[arg(short, long)]
    pub ignored: bool,
    /// Show mode, fingerprint and stage of index entries
    #[arg(short, long)]
    pub stage: bool,
    /// Show untracked paths that block checking out the index
    #[arg(short, long)]
    pub killed: bool,
    /// Report untracked directories whole
    #[arg(long)]
    pub directory: bool,
    /// With --directory, leave out directories without files
    #[arg(long)]
    pub no_empty_directory: bool,
    /// Show only unmerged entries (implies --stage)
    #[arg(short, long)]
    pub unmerged: bool,
    /// Show recorded pre-resolution conflict stages
    #[arg(long)]
    pub resolve_undo: bool,

    /// Skip untracked files matching the pattern
    #[arg(short = 'x', long = "exclude", value_name = "pattern")]
    pub exclude: Vec<String>,
    /// Read exclude patterns from a file
    #[arg(short = 'X', long = "exclude-from", value_name = "file")]
    pub exclude_from: Vec<PathBuf>,
    /// Read exclude patterns from this file in every directory
    #[arg(long, value_name = "file")]
    pub exclude_per_directory: Option<String>,
    /// Add the standard exclusions: info/exclude, core.excludes_file and
    /// per-directory ignore files
    #[arg(long)]
    pub exclude_standard: bool,

    /// Show paths relative to the work tree root
    #[arg(long)]
    pub full_name: bool,
    /// Fail if a path filter matches nothing
    #[arg(long)]
    pub error_unmatch: bool,
    /// Overlay a snapshot onto the index before listing
    #[arg(long, value_name = "tree-ish")]
    pub with_tree: Option<String>,
    /// Abbreviate fingerprints to at least n hex digits
    #[arg(long, value_name = "n", num_args = 0..=1, require_equals = true, default_missing_value = "7")]
    pub abbrev: Option<usize>,
    /// Print cached stat data after each index record
    #[arg(long)]
    pub debug: bool,

    /// Path filters
    pub paths: Vec<String>,
}

impl LsFilesArgs {
    pub fn into_request(self) -> LsRequest {
        LsRequest {
            cached: self.cached,
            deleted: self.deleted,
            modified: self.modified,
            others: self.others,
            ignored: self.ignored,
            stage: self.stage,
            killed: self.killed,
            unmerged: self.unmerged,
            resolve_undo: self.resolve_undo,
            tag_output: self.tags,
            valid_bit: self.valid_bit,
            with_tree: self.with_tree,
            error_unmatch: self.error_unmatch,
            abbrev: self.abbrev,
            directory: self.directory,
            no_empty_directory: self.no_empty_directory,
            terminator: if self.nul { Terminator::Nul } else { Terminator::Newline },
            full_name: self.full_name,
            debug: self.debug,
            excludes: ExcludeSources {
                patterns: self.exclude,
                from_files: self.exclude_from,
                per_directory: self.exclude_per_directory,
                standard: self.exclude_standard,
                excludes_file: None,
            },
            paths: self.paths,
        }
    }
}
