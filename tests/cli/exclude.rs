// Conserve backup system.
// Copyright 2022 Stephanie Aelmore.
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

use std::fs;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::run_increbak;

#[test]
fn excluded_subtree_is_absent_from_data() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    fs::create_dir(source.path().join("proj")).unwrap();
    fs::create_dir(source.path().join("proj").join(".git")).unwrap();
    fs::write(source.path().join("proj").join(".git").join("config"), b"x").unwrap();
    fs::create_dir(source.path().join("proj").join("src")).unwrap();
    fs::write(source.path().join("proj").join("src").join("main"), b"fn main(){}").unwrap();

    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .arg("--exclude")
        .arg(r".*/\.git/")
        .assert()
        .success()
        .stdout(predicate::str::contains("+1 / -0 files"));

    let backup_dir = fs::read_dir(target.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    let data = backup_dir.join("data");
    assert!(!data.join("proj").join(".git").exists());
    assert!(data.join("proj").join("src").join("main").exists());
}

#[test]
fn invalid_pattern_is_an_argument_error() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .arg("--exclude")
        .arg("(")
        .assert()
        .failure()
        .code(1);
}
