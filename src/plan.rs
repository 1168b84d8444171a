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

//! Diff a scan tree against a backup sum to decide what this backup
//! needs to copy or record as removed.

use crate::pathname::names_equal;
use crate::sum::SumDirectory;
use crate::tree::Directory;

/// One directory's worth of planned actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanDirectory {
    pub name: String,
    pub copied_files: Vec<String>,
    pub removed_files: Vec<String>,
    pub removed_directories: Vec<String>,
    pub subdirectories: Vec<PlanDirectory>,
    pub contains_copied_files: bool,
    pub contains_removed_items: bool,
}

/// Build the (unpruned) plan for `scan` against `sum`.
pub fn build(scan: &Directory, sum: &SumDirectory) -> PlanDirectory {
    let mut plan = build_directory(scan, Some(sum));
    annotate(&mut plan);
    plan
}

fn build_directory(scan: &Directory, sum: Option<&SumDirectory>) -> PlanDirectory {
    let mut plan = PlanDirectory {
        name: scan.name.clone(),
        ..Default::default()
    };

    for file in &scan.files {
        let previous = sum.and_then(|s| {
            s.files
                .iter()
                .find(|f| names_equal(&f.name, &file.name))
        });
        let needs_copy = match previous {
            None => true,
            Some(prev) => file.last_modified > prev.last_backup.start_info.start_time,
        };
        if needs_copy {
            plan.copied_files.push(file.name.clone());
        }
    }

    if let Some(sum) = sum {
        for sum_file in &sum.files {
            if !scan
                .files
                .iter()
                .any(|f| names_equal(&f.name, &sum_file.name))
            {
                plan.removed_files.push(sum_file.name.clone());
            }
        }
        for sum_dir in &sum.subdirectories {
            if !scan
                .subdirectories
                .iter()
                .any(|d| names_equal(&d.name, &sum_dir.name))
            {
                plan.removed_directories.push(sum_dir.name.clone());
            }
        }
    }

    for scan_dir in &scan.subdirectories {
        let child_sum = sum.and_then(|s| {
            s.subdirectories
                .iter()
                .find(|d| names_equal(&d.name, &scan_dir.name))
        });
        plan.subdirectories.push(build_directory(scan_dir, child_sum));
    }

    plan
}

/// Compute `contains_copied_files`/`contains_removed_items` bottom-up and
/// drop subdirectories where both are false. The directory passed in
/// (normally the root) is never itself dropped.
fn annotate(dir: &mut PlanDirectory) {
    let mut kept = Vec::with_capacity(dir.subdirectories.len());
    for mut child in std::mem::take(&mut dir.subdirectories) {
        annotate(&mut child);
        if child.contains_copied_files || child.contains_removed_items {
            kept.push(child);
        }
    }
    dir.subdirectories = kept;

    dir.contains_copied_files = !dir.copied_files.is_empty()
        || dir.subdirectories.iter().any(|c| c.contains_copied_files);
    dir.contains_removed_items = !dir.removed_files.is_empty()
        || !dir.removed_directories.is_empty()
        || dir
            .subdirectories
            .iter()
            .any(|c| c.contains_removed_items);
}
