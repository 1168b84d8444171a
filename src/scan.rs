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

//! Walk a source directory, applying exclude patterns, and build a
//! [`Directory`] tree describing what was found.
//!
//! The walk is iterative: a stack of in-progress directories stands in for
//! recursion, so scan depth is not bounded by the Rust call stack.

use std::collections::VecDeque;
use std::fs::DirEntry;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::exclude::Exclude;
use crate::tree::{directory_path, file_path, Directory, File};

/// Callbacks invoked for recoverable problems while scanning.
///
/// Every callback also causes a `tracing` event at the point it fires;
/// these closures exist for callers (and tests) that need to observe
/// exactly which paths were affected.
pub struct ScanCallbacks<'a> {
    pub on_exclude: Box<dyn FnMut(&Path) + 'a>,
    pub on_listdir_error: Box<dyn FnMut(&Path, &std::io::Error) + 'a>,
    pub on_metadata_error: Box<dyn FnMut(&Path, &std::io::Error) + 'a>,
}

impl<'a> Default for ScanCallbacks<'a> {
    fn default() -> Self {
        ScanCallbacks {
            on_exclude: Box::new(|_| {}),
            on_listdir_error: Box::new(|_, _| {}),
            on_metadata_error: Box::new(|_, _| {}),
        }
    }
}

pub struct ScanResult {
    pub tree: Directory,
    pub paths_skipped: bool,
}

struct Frame {
    dir: Directory,
    segments: Vec<String>,
    pending: VecDeque<DirEntry>,
}

/// Scan `source_root`, applying `exclude`, and return the resulting tree.
pub fn scan(
    source_root: &Path,
    exclude: &Exclude,
    callbacks: &mut ScanCallbacks,
) -> ScanResult {
    let mut paths_skipped = false;
    if exclude.matches(&directory_path(&[])) {
        (callbacks.on_exclude)(source_root);
        return ScanResult {
            tree: Directory::root(),
            paths_skipped,
        };
    }
    let root_entries =
        read_dir_tolerant(source_root, callbacks, &mut paths_skipped).unwrap_or_default();
    let mut stack = vec![Frame {
        dir: Directory::root(),
        segments: Vec::new(),
        pending: root_entries,
    }];

    loop {
        let entry = stack.last_mut().unwrap().pending.pop_front();
        match entry {
            Some(entry) => {
                let name = entry.file_name().to_string_lossy().into_owned();
                let metadata = match entry.metadata() {
                    Ok(m) => m,
                    Err(e) => {
                        (callbacks.on_metadata_error)(&entry.path(), &e);
                        warn!(path = %entry.path().display(), error = %e, "could not read metadata");
                        paths_skipped = true;
                        continue;
                    }
                };
                if metadata.is_dir() {
                    let frame = stack.last().unwrap();
                    let mut child_segments = frame.segments.clone();
                    child_segments.push(name.clone());
                    let segment_refs: Vec<&str> =
                        child_segments.iter().map(String::as_str).collect();
                    let path_str = directory_path(&segment_refs);
                    if exclude.matches(&path_str) {
                        (callbacks.on_exclude)(&entry.path());
                        continue;
                    }
                    match read_dir_tolerant(&entry.path(), callbacks, &mut paths_skipped) {
                        Some(child_entries) => {
                            stack.push(Frame {
                                dir: Directory::named(name),
                                segments: child_segments,
                                pending: child_entries,
                            });
                        }
                        None => {
                            // The directory could not be listed at all;
                            // record it with no children rather than
                            // descending.
                            stack
                                .last_mut()
                                .unwrap()
                                .dir
                                .subdirectories
                                .push(Directory::named(name));
                        }
                    }
                } else if metadata.is_file() {
                    let frame = stack.last().unwrap();
                    let segment_refs: Vec<&str> =
                        frame.segments.iter().map(String::as_str).collect();
                    let path_str = file_path(&segment_refs, &name);
                    if exclude.matches(&path_str) {
                        (callbacks.on_exclude)(&entry.path());
                        continue;
                    }
                    let last_modified = match metadata.modified() {
                        Ok(t) => t.into(),
                        Err(e) => {
                            (callbacks.on_metadata_error)(&entry.path(), &e);
                            warn!(path = %entry.path().display(), error = %e, "could not read modification time");
                            paths_skipped = true;
                            continue;
                        }
                    };
                    stack
                        .last_mut()
                        .unwrap()
                        .dir
                        .files
                        .push(File { name, last_modified });
                }
                // Other entry kinds (symlinks, device files, ...) are
                // neither files nor directories in this model and are
                // silently skipped.
            }
            None => {
                let finished = stack.pop().unwrap();
                match stack.last_mut() {
                    Some(parent) => parent.dir.subdirectories.push(finished.dir),
                    None => {
                        return ScanResult {
                            tree: finished.dir,
                            paths_skipped,
                        }
                    }
                }
            }
        }
    }
}

/// Read a directory's entries, tolerating failure by reporting it through
/// the callbacks.
///
/// Returns `None` if the directory itself could not be opened for
/// listing; returns `Some` (possibly empty) otherwise, even if individual
/// entries within it could not be read.
fn read_dir_tolerant(
    path: &Path,
    callbacks: &mut ScanCallbacks,
    paths_skipped: &mut bool,
) -> Option<VecDeque<DirEntry>> {
    let read_dir = match std::fs::read_dir(path) {
        Ok(rd) => rd,
        Err(e) => {
            (callbacks.on_listdir_error)(path, &e);
            warn!(path = %path.display(), error = %e, "could not list directory");
            *paths_skipped = true;
            return None;
        }
    };
    let mut entries = VecDeque::new();
    for entry in read_dir {
        match entry {
            Ok(e) => entries.push_back(e),
            Err(e) => {
                (callbacks.on_listdir_error)(path, &e);
                warn!(path = %path.display(), error = %e, "error while listing directory");
                *paths_skipped = true;
            }
        }
    }
    Some(entries)
}
