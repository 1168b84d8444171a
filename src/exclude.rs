// Conserve backup system.
// Copyright 2022 Stephanie Aelmore.
// Copyright 2017 Julian Raufelder.
// Copyright 2020, 2021, 2022 Martin Pool.

// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

//! Decide which paths to leave out of a backup.
//!
//! Patterns are regular expressions, matched in full against a
//! canonicalised, POSIX-style absolute path: directories end in `/`, files
//! do not.

use regex::Regex;

use crate::errors::Error;
use crate::Result;

/// A compiled set of exclude patterns.
#[derive(Clone, Debug, Default)]
pub struct Exclude {
    patterns: Vec<Regex>,
}

impl Exclude {
    /// Compile an `Exclude` from a list of regex strings.
    pub fn from_strings<I, S>(patterns: I) -> Result<Exclude>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for pat in patterns {
            compiled.push(compile_full_match(pat.as_ref())?);
        }
        Ok(Exclude { patterns: compiled })
    }

    /// An `Exclude` that never excludes anything.
    pub fn none() -> Exclude {
        Exclude {
            patterns: Vec::new(),
        }
    }

    /// True if `path` should be excluded from the backup.
    ///
    /// `path` must already be the canonicalised absolute form: POSIX
    /// separators, directories ending in `/`.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }
}

/// Wrap a user pattern so that it must match the whole input, with `.`
/// matching newlines, regardless of what the caller wrote.
fn compile_full_match(pattern: &str) -> Result<Regex> {
    let wrapped = format!("(?s)\\A(?:{})\\z", pattern);
    Regex::new(&wrapped).map_err(|source| Error::InvalidExcludePattern {
        pattern: pattern.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_list_excludes_nothing() {
        let exclude = Exclude::none();
        assert!(!exclude.matches("/foo"));
        assert!(!exclude.matches("/"));
    }

    #[test]
    fn literal_pattern_matches_exactly() {
        let exclude = Exclude::from_strings(["/foo"]).unwrap();
        assert!(exclude.matches("/foo"));
        assert!(!exclude.matches("/foobar"));
        assert!(!exclude.matches("/foo/"));
    }

    #[test]
    fn directory_patterns_match_trailing_slash() {
        let exclude = Exclude::from_strings([r".*/\.git/"]).unwrap();
        assert!(exclude.matches("/proj/.git/"));
        assert!(!exclude.matches("/proj/.git"));
        assert!(!exclude.matches("/proj/src/main"));
    }

    #[test]
    fn dot_matches_newlines() {
        // (?s) makes `.` match everything including newlines, so a pattern
        // of `.*` matches a path containing one.
        let exclude = Exclude::from_strings([".*"]).unwrap();
        assert!(exclude.matches("/a\n/b"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(Exclude::from_strings(["("]).is_err());
    }
}
