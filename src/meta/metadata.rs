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

//! A loaded backup's identity and history, deliberately excluding
//! completion info: a backup whose completion record is missing or
//! unreadable is still a perfectly good source of history.

use std::path::{Path, PathBuf};

use super::manifest::ManifestDirectory;
use super::start_info::StartInfo;
use super::structure::{self, MANIFEST_FILENAME, START_INFO_FILENAME};
use crate::Result;

/// Everything known about one backup that the sum-folding and restore
/// logic need.
#[derive(Debug, Clone)]
pub struct BackupMetadata {
    pub name: String,
    pub path: PathBuf,
    pub start_info: StartInfo,
    pub manifest: ManifestDirectory,
}

impl BackupMetadata {
    /// Load a backup's metadata from its directory.
    pub fn read(path: &Path) -> Result<BackupMetadata> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let start_info = StartInfo::read(&path.join(START_INFO_FILENAME))?;
        let manifest = super::manifest::read(&path.join(MANIFEST_FILENAME))?;
        Ok(BackupMetadata {
            name,
            path: path.to_owned(),
            start_info,
            manifest,
        })
    }

    /// The root of this backup's copied-file data, mirroring the source
    /// tree shape.
    pub fn data_dir(&self) -> PathBuf {
        self.path.join(structure::DATA_DIRECTORY_NAME)
    }
}
