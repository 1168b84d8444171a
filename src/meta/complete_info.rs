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

//! `completion.json`: records when a backup finished, and whether any
//! paths were skipped along the way. Absence or a write failure of this
//! file is informational only — it never fails the backup itself.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use crate::errors::Error;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteInfo {
    #[serde(with = "timestamp")]
    pub end_time: DateTime<Utc>,
    pub paths_skipped: bool,
}

impl CompleteInfo {
    pub fn now(paths_skipped: bool) -> CompleteInfo {
        CompleteInfo {
            end_time: Utc::now(),
            paths_skipped,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).expect("CompleteInfo always serializes");
        std::fs::write(path, json).map_err(|source| Error::WriteFile {
            path: path.to_owned(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<CompleteInfo> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::ParseJson {
            path: path.to_owned(),
            source,
        })
    }
}
