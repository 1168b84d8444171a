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

//! Platform-appropriate path-component comparison, used everywhere two
//! names need to be recognised as "the same path segment".

/// True if `a` and `b` name the same filesystem entry on this platform.
///
/// On Windows, filesystem names are case-insensitive, so comparison folds
/// ASCII case. Elsewhere names are compared byte-for-byte.
pub fn names_equal(a: &str, b: &str) -> bool {
    if cfg!(target_family = "windows") {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// Canonicalise a single path segment the same way [`names_equal`] compares
/// it, so that exclude-pattern matching sees the same identity the rest of
/// the system uses.
pub fn canonicalize_segment(segment: &str) -> String {
    if cfg!(target_family = "windows") {
        segment.to_ascii_lowercase()
    } else {
        segment.to_owned()
    }
}

/// Find the position of the first element of `names` that is name-equal to
/// `target`.
pub fn find_name_equal<'a, I, S>(names: I, target: &str) -> Option<usize>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + 'a,
{
    names
        .into_iter()
        .position(|n| names_equal(n.as_ref(), target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_names_are_equal() {
        assert!(names_equal("foo", "foo"));
    }

    #[test]
    fn different_names_are_not_equal() {
        assert!(!names_equal("foo", "bar"));
    }

    #[test]
    fn find_name_equal_locates_match() {
        let names = vec!["alpha".to_string(), "beta".to_string()];
        assert_eq!(find_name_equal(&names, "beta"), Some(1));
        assert_eq!(find_name_equal(&names, "gamma"), None);
    }

    #[test]
    fn canonicalize_segment_is_identity_off_windows() {
        if !cfg!(target_family = "windows") {
            assert_eq!(canonicalize_segment("MixedCase"), "MixedCase");
        }
    }
}
