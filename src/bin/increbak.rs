// Conserve backup system.
// Copyright 2015, 2016, 2017, 2018, 2019, 2020, 2021 Martin Pool.

// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

//! Command-line front end: `backup`, `restore`, `prune`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use increbak::backup::{backup, BackupCallbacks};
use increbak::errors::{Error, ErrorKind};
use increbak::exclude::Exclude;
use increbak::execute::ExecuteCallbacks;
use increbak::prune::{self, BackupPrunabilityOptions, PruneCallbacks, PruneConfig};
use increbak::restore::{self, RestoreSelection};
use increbak::{logging, Result};

#[derive(Parser)]
#[command(
    name = "increbak",
    about = "An incremental backup tool.",
    version
)]
struct Cli {
    /// Raise the console log level to debug.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new backup of SOURCE under TARGET.
    Backup {
        source: PathBuf,
        target: PathBuf,
        /// Regex full-match pattern to exclude; may be given more than once.
        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },
    /// Restore TARGET's accumulated state into DESTINATION.
    Restore {
        target: PathBuf,
        destination: PathBuf,
        /// Restore only up to this backup (by name), inclusive.
        #[arg(long, conflicts_with = "before")]
        backup: Option<String>,
        /// Restore only up to this point in time (ISO-8601), inclusive.
        #[arg(long)]
        before: Option<String>,
    },
    /// Delete backups that contribute nothing to the accumulated history.
    Prune {
        target: PathBuf,
        /// Actually delete; without this, prune only reports what it would do.
        #[arg(long)]
        commit: bool,
        /// Consider backups with an empty manifest and empty data directory.
        #[arg(long)]
        empty: bool,
        /// Also consider backups that carry unexpected stray files.
        #[arg(long = "other-data")]
        other_data: bool,
    },
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Command::Backup {
                source,
                target,
                exclude,
            } => run_backup(&source, &target, &exclude),
            Command::Restore {
                target,
                destination,
                backup,
                before,
            } => run_restore(&target, &destination, backup, before),
            Command::Prune {
                target,
                commit,
                empty,
                other_data,
            } => run_prune(&target, commit, empty, other_data),
        }
    }
}

fn run_backup(source: &std::path::Path, target: &std::path::Path, exclude: &[String]) -> Result<()> {
    let exclude = Exclude::from_strings(exclude)?;
    let outcome = backup(source, target, &exclude, BackupCallbacks::default())?;
    println!("{}", outcome.name);
    println!(
        "+{} / -{} files",
        outcome.results.files_copied, outcome.results.files_removed
    );
    Ok(())
}

fn run_restore(
    target: &std::path::Path,
    destination: &std::path::Path,
    backup: Option<String>,
    before: Option<String>,
) -> Result<()> {
    let before_dt = before
        .as_deref()
        .map(|raw| {
            increbak::meta::timestamp::parse(raw).map_err(|reason| Error::InvalidTimestamp {
                raw: raw.to_owned(),
                reason,
            })
        })
        .transpose()?;

    let selection = if let Some(name) = backup.as_deref() {
        RestoreSelection::Backup(name)
    } else if let Some(dt) = before_dt {
        RestoreSelection::Before(dt)
    } else {
        RestoreSelection::All
    };

    let mut callbacks = ExecuteCallbacks::default();
    let results = restore::restore(target, destination, selection, &mut callbacks)?;
    println!("restored {} files", results.files_restored);
    if results.paths_skipped {
        println!("(some paths were skipped; see log output above)");
    }
    Ok(())
}

fn run_prune(target: &std::path::Path, commit: bool, empty: bool, other_data: bool) -> Result<()> {
    let config = PruneConfig {
        dry_run: !commit,
        prunability: BackupPrunabilityOptions {
            prune_empty: empty,
            prune_other_data: other_data,
        },
    };
    let mut callbacks = PruneCallbacks::default();
    let results = prune::prune(target, &config, &mut callbacks)?;
    if commit {
        println!("deleted {} backups", results.deleted.len());
    } else {
        println!(
            "{} backups would be deleted (dry run, use --commit to delete)",
            results.prunable.len()
        );
    }
    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind as ClapErrorKind;
            let code = match e.kind() {
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            e.print().ok();
            std::process::exit(code);
        }
    };
    logging::init(cli.verbose);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| cli.command.run()));
    match result {
        Ok(Ok(())) => std::process::exit(0),
        Ok(Err(e)) => {
            eprintln!("error: {}", e);
            let code = match e.kind() {
                ErrorKind::Argument => 1,
                ErrorKind::Runtime => 2,
            };
            std::process::exit(code);
        }
        Err(_) => {
            eprintln!("error: internal error");
            std::process::exit(-1);
        }
    }
}
