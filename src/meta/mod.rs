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

//! On-disk metadata: directory layout, start/completion records, and the
//! manifest codec.

pub mod complete_info;
pub mod manifest;
pub mod metadata;
pub mod start_info;
pub mod structure;
pub mod timestamp;

pub use complete_info::CompleteInfo;
pub use manifest::ManifestDirectory;
pub use metadata::BackupMetadata;
pub use start_info::StartInfo;

/// Read every plausible backup directory directly under `target`, in
/// unspecified order, logging and skipping any that fail to load.
///
/// A directory that does not look like a backup at all (per
/// [`structure::is_probably_backup_directory`]) is logged at `warn` level
/// and otherwise ignored, since stray files under the target are expected
/// to happen (editors, OS metadata files, partially-written backups from
/// an older tool version) and are not this system's concern.
pub fn read_previous_backups(target: &std::path::Path) -> crate::Result<Vec<BackupMetadata>> {
    use tracing::warn;

    if !target.exists() {
        return Ok(Vec::new());
    }
    let read_dir = std::fs::read_dir(target).map_err(|source| crate::errors::Error::ListDirectory {
        path: target.to_owned(),
        source,
    })?;
    let mut backups = Vec::new();
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
            warn!(path = %path.display(), "not a valid backup directory, ignoring");
            continue;
        }
        match BackupMetadata::read(&path) {
            Ok(meta) => backups.push(meta),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read backup metadata, skipping");
            }
        }
    }
    Ok(backups)
}
