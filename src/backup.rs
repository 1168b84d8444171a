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

//! Orchestrate a single incremental backup: read prior history, scan the
//! source, plan the diff, execute it, and persist the result.

use std::path::Path;

use tracing::{info, warn};

use crate::errors::Error;
use crate::exclude::Exclude;
use crate::execute::{self, BackupResults, ExecuteCallbacks};
use crate::meta::complete_info::CompleteInfo;
use crate::meta::start_info::StartInfo;
use crate::meta::structure::{self, COMPLETE_INFO_FILENAME, DATA_DIRECTORY_NAME, MANIFEST_FILENAME, START_INFO_FILENAME};
use crate::meta::{self, manifest};
use crate::plan;
use crate::scan::{self, ScanCallbacks};
use crate::sum;
use crate::Result;

/// Per-path problem callbacks for a backup run.
///
/// Each callback also causes a `tracing` warning at the point it fires;
/// these exist for callers that need to observe exactly which paths were
/// affected.
pub struct BackupCallbacks<'a> {
    pub on_exclude: Box<dyn FnMut(&Path) + 'a>,
    pub on_listdir_error: Box<dyn FnMut(&Path, &std::io::Error) + 'a>,
    pub on_metadata_error: Box<dyn FnMut(&Path, &std::io::Error) + 'a>,
    pub on_mkdir_error: Box<dyn FnMut(&Path, &std::io::Error) + 'a>,
    pub on_copy_error: Box<dyn FnMut(&Path, &std::io::Error) + 'a>,
}

impl<'a> Default for BackupCallbacks<'a> {
    fn default() -> Self {
        BackupCallbacks {
            on_exclude: Box::new(|_| {}),
            on_listdir_error: Box::new(|_, _| {}),
            on_metadata_error: Box::new(|_, _| {}),
            on_mkdir_error: Box::new(|_, _| {}),
            on_copy_error: Box::new(|_, _| {}),
        }
    }
}

/// What a completed backup run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupOutcome {
    pub name: String,
    pub results: BackupResults,
}

/// Run a single incremental backup of `source` into a new directory under
/// `target`.
pub fn backup(
    source: &Path,
    target: &Path,
    exclude: &Exclude,
    callbacks: BackupCallbacks,
) -> Result<BackupOutcome> {
    if !source.is_dir() {
        return Err(Error::SourceNotADirectory {
            path: source.to_owned(),
        });
    }
    if target.is_file() {
        return Err(Error::TargetNotADirectory {
            path: target.to_owned(),
        });
    }

    let previous_backups = meta::read_previous_backups(target)?;
    let backup_sum = sum::from_backups(&previous_backups);

    let backup_dir = structure::create_new_backup_directory(target)?;
    let data_dir = backup_dir.join(DATA_DIRECTORY_NAME);
    std::fs::create_dir(&data_dir).map_err(|source_err| Error::CreateDirectory {
        path: data_dir.clone(),
        source: source_err,
    })?;
    StartInfo::now().write(&backup_dir.join(START_INFO_FILENAME))?;

    let BackupCallbacks {
        on_exclude,
        on_listdir_error,
        on_metadata_error,
        on_mkdir_error,
        on_copy_error,
    } = callbacks;
    let mut scan_callbacks = ScanCallbacks {
        on_exclude,
        on_listdir_error,
        on_metadata_error,
    };
    let mut execute_callbacks = ExecuteCallbacks {
        on_mkdir_error,
        on_copy_error,
    };

    let scan_result = scan::scan(source, exclude, &mut scan_callbacks);
    let plan = plan::build(&scan_result.tree, &backup_sum);
    let (new_manifest, exec_results) =
        execute::execute(&plan, source, &data_dir, &mut execute_callbacks);

    let paths_skipped = scan_result.paths_skipped || exec_results.paths_skipped;
    manifest::write(&new_manifest, &backup_dir.join(MANIFEST_FILENAME))?;

    let completion = CompleteInfo::now(paths_skipped);
    if let Err(e) = completion.write(&backup_dir.join(COMPLETE_INFO_FILENAME)) {
        warn!(backup = %backup_dir.display(), error = %e, "could not write completion info");
    }

    let name = backup_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let results = BackupResults {
        paths_skipped,
        files_copied: exec_results.files_copied,
        files_removed: exec_results.files_removed,
    };
    info!(
        backup = %name,
        files_copied = results.files_copied,
        files_removed = results.files_removed,
        paths_skipped = results.paths_skipped,
        "backup complete",
    );
    Ok(BackupOutcome { name, results })
}
