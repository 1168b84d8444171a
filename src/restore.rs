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

//! Restore: the mirror of plan execution, driven by a backup sum instead
//! of a live source scan. Folds backups up to a selected point, then
//! copies each surviving file from wherever it was last stored.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::errors::Error;
use crate::execute::ExecuteCallbacks;
use crate::meta::{self, BackupMetadata};
use crate::sum::{self, SumDirectory};
use crate::Result;

/// Which backups to fold into the restored state.
pub enum RestoreSelection<'a> {
    /// Everything readable: restores the latest accumulated state.
    All,
    /// Only backups no later than the one named.
    Backup(&'a str),
    /// Only backups that started at or before this time.
    Before(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreResults {
    pub paths_skipped: bool,
    pub files_restored: usize,
}

/// Restore `target`'s accumulated state (per `selection`) into
/// `destination`. `destination` need not be empty: restore only ever
/// creates or overwrites the paths named by the selected backups.
pub fn restore(
    target: &Path,
    destination: &Path,
    selection: RestoreSelection,
    callbacks: &mut ExecuteCallbacks,
) -> Result<RestoreResults> {
    let previous = meta::read_previous_backups(target)?;
    let selected = select_backups(&previous, target, &selection)?;
    let backup_sum = sum::from_backups(selected);

    let mut results = RestoreResults::default();
    restore_directory(&backup_sum, destination, &[], false, callbacks, &mut results);
    Ok(results)
}

fn select_backups<'a>(
    previous: &'a [BackupMetadata],
    target: &Path,
    selection: &RestoreSelection,
) -> Result<Vec<&'a BackupMetadata>> {
    match selection {
        RestoreSelection::All => Ok(previous.iter().collect()),
        RestoreSelection::Backup(name) => {
            let found = previous
                .iter()
                .find(|b| b.name == *name)
                .ok_or_else(|| Error::BackupNotFound {
                    name: (*name).to_owned(),
                    target: target.to_owned(),
                })?;
            let threshold = found.start_info.start_time;
            Ok(previous
                .iter()
                .filter(|b| b.start_info.start_time <= threshold)
                .collect())
        }
        RestoreSelection::Before(time) => Ok(previous
            .iter()
            .filter(|b| b.start_info.start_time <= *time)
            .collect()),
    }
}

fn restore_directory(
    sum_dir: &SumDirectory,
    dest_dir: &Path,
    segments: &[String],
    parent_mkdir_failed: bool,
    callbacks: &mut ExecuteCallbacks,
    results: &mut RestoreResults,
) {
    let mut mkdir_failed = parent_mkdir_failed;
    if !mkdir_failed {
        if let Err(e) = std::fs::create_dir_all(dest_dir) {
            (callbacks.on_mkdir_error)(dest_dir, &e);
            warn!(path = %dest_dir.display(), error = %e, "could not create directory");
            results.paths_skipped = true;
            mkdir_failed = true;
        }
    }

    if !mkdir_failed {
        for file in &sum_dir.files {
            let mut relative = std::path::PathBuf::new();
            for seg in segments {
                relative.push(seg);
            }
            relative.push(&file.name);
            let source_path = file.last_backup.data_dir().join(&relative);
            let dest_path = dest_dir.join(&file.name);
            match copy_preserving_mtime(&source_path, &dest_path) {
                Ok(()) => results.files_restored += 1,
                Err(e) => {
                    (callbacks.on_copy_error)(&source_path, &e);
                    warn!(path = %source_path.display(), error = %e, "could not restore file");
                    results.paths_skipped = true;
                }
            }
        }
    }

    for child in &sum_dir.subdirectories {
        let mut child_segments = segments.to_vec();
        child_segments.push(child.name.clone());
        restore_directory(
            child,
            &dest_dir.join(&child.name),
            &child_segments,
            mkdir_failed,
            callbacks,
            results,
        );
    }
}

fn copy_preserving_mtime(source: &Path, dest: &Path) -> std::io::Result<()> {
    let source_metadata = std::fs::metadata(source)?;
    std::fs::copy(source, dest)?;
    let mtime = filetime::FileTime::from_last_modification_time(&source_metadata);
    filetime::set_file_mtime(dest, mtime)?;
    std::fs::set_permissions(dest, source_metadata.permissions())?;
    Ok(())
}
