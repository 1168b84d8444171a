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

//! Error types for the backup engine.
//!
//! Every fatal error carries a [`ErrorKind`] so that the CLI can map it to
//! the right exit code without string matching.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a fatal error, used for exit-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller asked for something that cannot be honored: bad paths,
    /// bad flag combinations, an unparseable exclude pattern.
    Argument,
    /// An I/O or parse failure from which the current operation cannot
    /// continue.
    Runtime,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("source directory does not exist or is not a directory: {path}")]
    SourceNotADirectory { path: PathBuf },

    #[error("target exists and is not a directory: {path}")]
    TargetNotADirectory { path: PathBuf },

    #[error("invalid exclude pattern {pattern:?}: {source}")]
    InvalidExcludePattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("invalid timestamp {raw:?}: {reason}")]
    InvalidTimestamp { raw: String, reason: String },

    #[error("no backup named {name:?} was found in {target}")]
    BackupNotFound { name: String, target: PathBuf },

    #[error("prune requires at least one of --empty or --other-data")]
    NoPrunabilityOptionsGiven,

    #[error("could not list directory {path}: {source}")]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not create backup directory under {target} after {attempts} attempts")]
    BackupDirectoryCreation { target: PathBuf, attempts: u32 },

    #[error("could not create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path}: {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not parse manifest {path}: {reason}")]
    ParseManifest { path: PathBuf, reason: String },

    #[error("could not delete {path}: {source}")]
    DeleteDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// The [`ErrorKind`] used to choose a process exit code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SourceNotADirectory { .. }
            | Error::TargetNotADirectory { .. }
            | Error::InvalidExcludePattern { .. }
            | Error::InvalidTimestamp { .. }
            | Error::NoPrunabilityOptionsGiven => ErrorKind::Argument,
            Error::BackupNotFound { .. }
            | Error::ListDirectory { .. }
            | Error::BackupDirectoryCreation { .. }
            | Error::CreateDirectory { .. }
            | Error::ReadFile { .. }
            | Error::WriteFile { .. }
            | Error::ParseJson { .. }
            | Error::ParseManifest { .. }
            | Error::DeleteDirectory { .. } => ErrorKind::Runtime,
        }
    }
}
