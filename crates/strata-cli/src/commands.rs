use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;
use strata_ls::Repository;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Init(args) => cmd_init(args),
        Command::LsFiles(args) => cmd_ls_files(args),
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<ExitCode> {
    let path = args.path.unwrap_or_else(|| PathBuf::from("."));
    let repo = Repository::init(&path)?;
    println!(
        "{} Initialized empty strata repository in {}",
        "✓".green().bold(),
        repo.repo_dir().display().to_string().bold()
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_ls_files(args: LsFilesArgs) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let (repo, prefix) = Repository::discover(&cwd)?;
    let out = BufWriter::new(io::stdout().lock());
    let outcome = strata_ls::run(&repo, &prefix, args.into_request(), out)?;

    for path in &outcome.unmatched {
        eprintln!(
            "{} pathspec '{}' did not match any file(s) known to strata.",
            "error:".red().bold(),
            path
        );
    }
    if !outcome.is_success() {
        eprintln!("Did you forget to 'strata add'?");
    }
    Ok(ExitCode::from(outcome.exit_code()))
}
