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

//! Small, reusable scaffolding for tests, both inside and outside this
//! crate. Not `#[cfg(test)]`-gated so integration tests can use it too.

use std::path::Path;

/// Write `(relative_path, content)` pairs under `root`, creating parent
/// directories as needed.
///
/// Relative paths use `/` regardless of platform.
pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directory for test fixture");
        }
        std::fs::write(&path, content).expect("write test fixture file");
    }
}

/// Set a file's modification time to a fixed Unix timestamp, so tests
/// don't depend on filesystem mtime resolution or wall-clock timing.
pub fn set_mtime(path: &Path, unix_seconds: i64) {
    let ft = filetime::FileTime::from_unix_time(unix_seconds, 0);
    filetime::set_file_mtime(path, ft).expect("set mtime for test fixture file");
}
