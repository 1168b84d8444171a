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

//! An incremental backup engine: back up a source directory tree into a
//! target directory that accumulates an ordered sequence of backups, each
//! recording only what changed since the prior ones; restore by replaying
//! that history; prune backups that add no information.

pub mod backup;
pub mod errors;
pub mod exclude;
pub mod execute;
pub mod logging;
pub mod meta;
pub mod pathname;
pub mod plan;
pub mod prune;
pub mod restore;
pub mod scan;
pub mod sum;
pub mod test_fixtures;
pub mod tree;

pub use crate::errors::{Error, ErrorKind};

pub type Result<T> = std::result::Result<T, Error>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> &'static str {
    VERSION
}
