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

//! Identify and delete backups that contribute nothing: ones with an
//! empty manifest and empty data directory, optionally also ones that
//! additionally carry unexpected stray files.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::Error;
use crate::meta::structure::{
    self, COMPLETE_INFO_FILENAME, DATA_DIRECTORY_NAME, MANIFEST_FILENAME, START_INFO_FILENAME,
};
use crate::meta::BackupMetadata;
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackupPrunabilityOptions {
    pub prune_empty: bool,
    pub prune_other_data: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PruneConfig {
    pub dry_run: bool,
    pub prunability: BackupPrunabilityOptions,
}

/// Callbacks invoked for recoverable problems, and for visibility into
/// what prune chose to leave alone.
pub struct PruneCallbacks<'a> {
    pub on_not_a_backup_directory: Box<dyn FnMut(&Path) + 'a>,
    pub on_delete_error: Box<dyn FnMut(&Path, &std::io::Error) + 'a>,
}

impl<'a> Default for PruneCallbacks<'a> {
    fn default() -> Self {
        PruneCallbacks {
            on_not_a_backup_directory: Box::new(|_| {}),
            on_delete_error: Box::new(|_, _| {}),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneResults {
    /// Names of backups classified as prunable under the given options.
    pub prunable: Vec<String>,
    /// Names of backups actually deleted (empty unless `dry_run` is false).
    pub deleted: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    Empty,
    StrayData,
    Useful,
}

fn classify(meta: &BackupMetadata, dir_path: &Path) -> std::io::Result<Classification> {
    let manifest_empty = meta.manifest.is_empty_tree();
    let data_empty = dir_is_empty(&meta.data_dir())?;
    if !manifest_empty || !data_empty {
        return Ok(Classification::Useful);
    }
    if has_stray_entries(dir_path)? {
        Ok(Classification::StrayData)
    } else {
        Ok(Classification::Empty)
    }
}

fn dir_is_empty(path: &Path) -> std::io::Result<bool> {
    match std::fs::read_dir(path) {
        Ok(mut entries) => Ok(entries.next().is_none()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e),
    }
}

fn has_stray_entries(dir_path: &Path) -> std::io::Result<bool> {
    const EXPECTED: [&str; 4] = [
        START_INFO_FILENAME,
        MANIFEST_FILENAME,
        COMPLETE_INFO_FILENAME,
        DATA_DIRECTORY_NAME,
    ];
    for entry in std::fs::read_dir(dir_path)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !EXPECTED.contains(&name.as_ref()) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_prunable(classification: Classification, options: BackupPrunabilityOptions) -> bool {
    match classification {
        Classification::Useful => false,
        Classification::Empty => options.prune_empty,
        Classification::StrayData => options.prune_empty && options.prune_other_data,
    }
}

/// Enumerate `target`'s backups and delete the ones that are prunable
/// under `config.prunability`, unless `config.dry_run` is set.
pub fn prune(
    target: &Path,
    config: &PruneConfig,
    callbacks: &mut PruneCallbacks,
) -> Result<PruneResults> {
    if !config.prunability.prune_empty && !config.prunability.prune_other_data {
        return Err(Error::NoPrunabilityOptionsGiven);
    }

    let read_dir = std::fs::read_dir(target).map_err(|source| Error::ListDirectory {
        path: target.to_owned(),
        source,
    })?;

    let mut results = PruneResults::default();
    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(target = %target.display(), error = %e, "error while listing target directory");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if !structure::is_probably_backup_directory(&path) {
            (callbacks.on_not_a_backup_directory)(&path);
            continue;
        }
        candidates.push(path);
    }

    for path in candidates {
        let meta = match BackupMetadata::read(&path) {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read backup metadata, skipping");
                continue;
            }
        };
        let classification = match classify(&meta, &path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not inspect backup, skipping");
                continue;
            }
        };
        if !is_prunable(classification, config.prunability) {
            continue;
        }
        results.prunable.push(meta.name.clone());
        if config.dry_run {
            info!(backup = %meta.name, "(dry run) would delete prunable backup");
            continue;
        }
        match std::fs::remove_dir_all(&path) {
            Ok(()) => {
                info!(backup = %meta.name, "deleted prunable backup");
                results.deleted.push(meta.name);
            }
            Err(e) => {
                (callbacks.on_delete_error)(&path, &e);
                warn!(path = %path.display(), error = %e, "could not delete backup");
            }
        }
    }

    Ok(results)
}
