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

//! The backup sum: folding an ordered sequence of manifests into a
//! virtual tree of every file that survives to the present, annotated
//! with the backup that last copied it.

use crate::meta::{BackupMetadata, ManifestDirectory};
use crate::pathname::names_equal;

/// A file as it exists in the folded view of backup history.
#[derive(Debug, Clone)]
pub struct SumFile<'a> {
    pub name: String,
    pub last_backup: &'a BackupMetadata,
}

/// A directory as it exists in the folded view of backup history.
#[derive(Debug, Clone, Default)]
pub struct SumDirectory<'a> {
    pub name: String,
    pub files: Vec<SumFile<'a>>,
    pub subdirectories: Vec<SumDirectory<'a>>,
}

impl<'a> SumDirectory<'a> {
    fn root() -> SumDirectory<'a> {
        SumDirectory::default()
    }

    fn find_file_index(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|f| names_equal(&f.name, name))
    }

    fn find_dir_index(&self, name: &str) -> Option<usize> {
        self.subdirectories
            .iter()
            .position(|d| names_equal(&d.name, name))
    }

    /// Look up a descendant directory by its sequence of path segments
    /// (relative to this directory), following name-equal comparisons.
    pub fn find_directory(&self, segments: &[&str]) -> Option<&SumDirectory<'a>> {
        let mut current = self;
        for seg in segments {
            let idx = current.find_dir_index(seg)?;
            current = &current.subdirectories[idx];
        }
        Some(current)
    }
}

/// Fold `backups` (in any order) into a backup sum, pruned of directories
/// with no surviving files.
pub fn from_backups<'a, I>(backups: I) -> SumDirectory<'a>
where
    I: IntoIterator<Item = &'a BackupMetadata>,
{
    let mut ordered: Vec<&'a BackupMetadata> = backups.into_iter().collect();
    ordered.sort_by_key(|b| b.start_info.start_time);

    let mut root = SumDirectory::root();
    for backup in ordered {
        fold_manifest(&mut root, &backup.manifest, backup);
    }
    prune(&mut root);
    root
}

fn fold_manifest<'a>(
    sum_dir: &mut SumDirectory<'a>,
    manifest_dir: &ManifestDirectory,
    backup: &'a BackupMetadata,
) {
    for name in &manifest_dir.copied_files {
        if let Some(idx) = sum_dir.find_file_index(name) {
            sum_dir.files.remove(idx);
        }
        sum_dir.files.push(SumFile {
            name: name.clone(),
            last_backup: backup,
        });
    }
    for name in &manifest_dir.removed_files {
        if let Some(idx) = sum_dir.find_file_index(name) {
            sum_dir.files.remove(idx);
        }
    }
    for name in &manifest_dir.removed_directories {
        if let Some(idx) = sum_dir.find_dir_index(name) {
            sum_dir.subdirectories.remove(idx);
        }
    }
    for child_manifest in &manifest_dir.subdirectories {
        let idx = match sum_dir.find_dir_index(&child_manifest.name) {
            Some(idx) => idx,
            None => {
                sum_dir
                    .subdirectories
                    .push(SumDirectory {
                        name: child_manifest.name.clone(),
                        ..Default::default()
                    });
                sum_dir.subdirectories.len() - 1
            }
        };
        fold_manifest(&mut sum_dir.subdirectories[idx], child_manifest, backup);
    }
}

/// Remove subdirectories with zero transitive files. The root is never
/// removed by its caller, regardless of the boolean this returns.
fn prune(dir: &mut SumDirectory) -> bool {
    let children = std::mem::take(&mut dir.subdirectories);
    dir.subdirectories = children
        .into_iter()
        .filter_map(|mut child| {
            if prune(&mut child) {
                Some(child)
            } else {
                None
            }
        })
        .collect();
    !dir.files.is_empty() || !dir.subdirectories.is_empty()
}
