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

//! On-disk layout of a backup directory, and creation of new ones.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::errors::Error;
use crate::Result;

pub const MANIFEST_FILENAME: &str = "manifest.json";
pub const START_INFO_FILENAME: &str = "start.json";
pub const COMPLETE_INFO_FILENAME: &str = "completion.json";
pub const DATA_DIRECTORY_NAME: &str = "data";

const BACKUP_NAME_LENGTH: usize = 16;
const BACKUP_NAME_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const BACKUP_DIRECTORY_CREATION_RETRIES: u32 = 20;

/// Generate a random 16-character `[a-z0-9]` backup name.
pub fn generate_backup_name() -> String {
    let mut rng = rand::thread_rng();
    (0..BACKUP_NAME_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..BACKUP_NAME_ALPHABET.len());
            BACKUP_NAME_ALPHABET[idx] as char
        })
        .collect()
}

/// Create a new, uniquely named backup directory directly under `target`.
///
/// Retries with a freshly generated name if the chosen name collides with
/// an existing entry. Returns the full path of the created directory.
pub fn create_new_backup_directory(target: &Path) -> Result<PathBuf> {
    for _ in 0..BACKUP_DIRECTORY_CREATION_RETRIES {
        let candidate = target.join(generate_backup_name());
        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(Error::CreateDirectory {
                    path: candidate,
                    source: e,
                })
            }
        }
    }
    Err(Error::BackupDirectoryCreation {
        target: target.to_owned(),
        attempts: BACKUP_DIRECTORY_CREATION_RETRIES,
    })
}

/// True if `name` could plausibly be a backup directory name: ASCII
/// alphanumeric, matching the shape [`generate_backup_name`] produces.
///
/// This is deliberately permissive about length and case so that backups
/// written by other tool versions are still recognised.
pub fn looks_like_backup_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// True if `dir` contains the files that make it "probably a backup":
/// a name that looks like a backup name, plus `start.json` and
/// `manifest.json` present as regular files.
pub fn is_probably_backup_directory(dir: &Path) -> bool {
    let name_ok = dir
        .file_name()
        .and_then(|n| n.to_str())
        .map(looks_like_backup_name)
        .unwrap_or(false);
    name_ok
        && dir.join(START_INFO_FILENAME).is_file()
        && dir.join(MANIFEST_FILENAME).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_name_has_expected_shape() {
        let name = generate_backup_name();
        assert_eq!(name.len(), BACKUP_NAME_LENGTH);
        assert!(name
            .bytes()
            .all(|b| BACKUP_NAME_ALPHABET.contains(&b)));
    }

    #[test]
    fn create_new_backup_directory_creates_a_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let created = create_new_backup_directory(tmp.path()).unwrap();
        assert!(created.is_dir());
        assert!(created.starts_with(tmp.path()));
    }

    #[test]
    fn looks_like_backup_name_rejects_punctuation() {
        assert!(looks_like_backup_name("abc123"));
        assert!(!looks_like_backup_name("abc-123"));
        assert!(!looks_like_backup_name(""));
    }

    #[test]
    fn is_probably_backup_directory_requires_expected_files() {
        let tmp = tempfile::tempdir().unwrap();
        let backup_dir = tmp.path().join("abcdef0123456789");
        std::fs::create_dir(&backup_dir).unwrap();
        assert!(!is_probably_backup_directory(&backup_dir));
        std::fs::write(backup_dir.join(START_INFO_FILENAME), "{}").unwrap();
        std::fs::write(backup_dir.join(MANIFEST_FILENAME), "[]").unwrap();
        assert!(is_probably_backup_directory(&backup_dir));
    }
}
