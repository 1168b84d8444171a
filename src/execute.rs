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

//! Execute a plan: create destination directories, copy files preserving
//! their modification time, and emit the manifest describing what
//! actually happened.

use std::path::Path;

use tracing::warn;

use crate::meta::ManifestDirectory;
use crate::plan::PlanDirectory;

/// Callbacks invoked for recoverable problems while executing a plan.
pub struct ExecuteCallbacks<'a> {
    pub on_mkdir_error: Box<dyn FnMut(&Path, &std::io::Error) + 'a>,
    pub on_copy_error: Box<dyn FnMut(&Path, &std::io::Error) + 'a>,
}

impl<'a> Default for ExecuteCallbacks<'a> {
    fn default() -> Self {
        ExecuteCallbacks {
            on_mkdir_error: Box::new(|_, _| {}),
            on_copy_error: Box::new(|_, _| {}),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackupResults {
    pub paths_skipped: bool,
    pub files_copied: usize,
    pub files_removed: usize,
}

/// Execute `plan`, reading file content from under `source_root` and
/// writing it under `dest_root`.
pub fn execute(
    plan: &PlanDirectory,
    source_root: &Path,
    dest_root: &Path,
    callbacks: &mut ExecuteCallbacks,
) -> (ManifestDirectory, BackupResults) {
    let mut results = BackupResults::default();
    let manifest = execute_directory(
        plan,
        source_root,
        dest_root,
        false,
        callbacks,
        &mut results,
    );
    (manifest, results)
}

fn execute_directory(
    plan: &PlanDirectory,
    source_dir: &Path,
    dest_dir: &Path,
    parent_mkdir_failed: bool,
    callbacks: &mut ExecuteCallbacks,
    results: &mut BackupResults,
) -> ManifestDirectory {
    let mut manifest = ManifestDirectory {
        name: plan.name.clone(),
        removed_files: plan.removed_files.clone(),
        removed_directories: plan.removed_directories.clone(),
        ..Default::default()
    };
    results.files_removed += plan.removed_files.len();

    let mut mkdir_failed = parent_mkdir_failed;
    if !mkdir_failed && plan.contains_copied_files {
        if let Err(e) = std::fs::create_dir_all(dest_dir) {
            (callbacks.on_mkdir_error)(dest_dir, &e);
            warn!(path = %dest_dir.display(), error = %e, "could not create directory");
            results.paths_skipped = true;
            mkdir_failed = true;
        }
    }

    if !mkdir_failed {
        for file_name in &plan.copied_files {
            let source_file = source_dir.join(file_name);
            let dest_file = dest_dir.join(file_name);
            match copy_preserving_mtime(&source_file, &dest_file) {
                Ok(()) => {
                    manifest.copied_files.push(file_name.clone());
                    results.files_copied += 1;
                }
                Err(e) => {
                    (callbacks.on_copy_error)(&source_file, &e);
                    warn!(path = %source_file.display(), error = %e, "could not copy file");
                    results.paths_skipped = true;
                }
            }
        }
    }

    for child in &plan.subdirectories {
        if mkdir_failed && !child.contains_removed_items {
            continue;
        }
        let child_manifest = execute_directory(
            child,
            &source_dir.join(&child.name),
            &dest_dir.join(&child.name),
            mkdir_failed,
            callbacks,
            results,
        );
        manifest.subdirectories.push(child_manifest);
    }

    manifest
}

/// Copy `source` to `dest`, preserving modification time and, where the
/// platform supports it, permissions.
fn copy_preserving_mtime(source: &Path, dest: &Path) -> std::io::Result<()> {
    let source_metadata = std::fs::metadata(source)?;
    std::fs::copy(source, dest)?;
    let mtime = filetime::FileTime::from_last_modification_time(&source_metadata);
    filetime::set_file_mtime(dest, mtime)?;
    std::fs::set_permissions(dest, source_metadata.permissions())?;
    Ok(())
}
