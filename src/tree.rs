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

//! In-memory representation of a scanned filesystem subtree.

use chrono::{DateTime, Utc};

use crate::pathname::canonicalize_segment;

/// A regular file found while scanning the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub name: String,
    pub last_modified: DateTime<Utc>,
}

/// A directory found while scanning the source, holding its immediate
/// children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    pub name: String,
    pub files: Vec<File>,
    pub subdirectories: Vec<Directory>,
}

impl Directory {
    pub fn root() -> Directory {
        Directory {
            name: String::new(),
            files: Vec::new(),
            subdirectories: Vec::new(),
        }
    }

    pub fn named(name: impl Into<String>) -> Directory {
        Directory {
            name: name.into(),
            files: Vec::new(),
            subdirectories: Vec::new(),
        }
    }
}

/// Build the canonicalised absolute POSIX-style path for a directory given
/// the stack of ancestor names (root excluded, root maps to `"/"`).
///
/// Directory paths always end in `/`.
pub fn directory_path(segments: &[&str]) -> String {
    let mut path = String::from("/");
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            path.push('/');
        }
        path.push_str(&canonicalize_segment(seg));
    }
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}

/// Build the canonicalised absolute POSIX-style path for a file given its
/// parent directory's segments and its own name.
pub fn file_path(dir_segments: &[&str], name: &str) -> String {
    let mut path = directory_path(dir_segments);
    path.push_str(&canonicalize_segment(name));
    path
}
