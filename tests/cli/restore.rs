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

use std::fs;

use assert_cmd::prelude::*;
use chrono::Utc;
use predicates::prelude::*;
use tempfile::TempDir;

use increbak::test_fixtures::set_mtime;

use crate::run_increbak;

#[test]
fn restore_reproduces_latest_state() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    fs::write(source.path().join("a"), b"v1").unwrap();
    fs::write(source.path().join("b"), b"stays").unwrap();
    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .success();

    let a_path = source.path().join("a");
    fs::write(&a_path, b"v2-longer").unwrap();
    set_mtime(&a_path, Utc::now().timestamp() + 86_400);
    fs::remove_file(source.path().join("b")).unwrap();
    fs::write(source.path().join("c"), b"new").unwrap();
    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .success();

    run_increbak()
        .arg("restore")
        .arg(target.path())
        .arg(dest.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("restored 2 files"));

    assert_eq!(fs::read(dest.path().join("a")).unwrap(), b"v2-longer");
    assert_eq!(fs::read(dest.path().join("c")).unwrap(), b"new");
    assert!(!dest.path().join("b").exists());
}

#[test]
fn restore_by_backup_name_stops_at_that_point() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    fs::write(source.path().join("a"), b"v1").unwrap();
    let first = run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .output()
        .unwrap();
    let first_name = String::from_utf8(first.stdout).unwrap().lines().next().unwrap().to_string();

    fs::write(source.path().join("b"), b"added-later").unwrap();
    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .success();

    run_increbak()
        .arg("restore")
        .arg(target.path())
        .arg(dest.path())
        .arg("--backup")
        .arg(&first_name)
        .assert()
        .success();

    assert!(dest.path().join("a").exists());
    assert!(!dest.path().join("b").exists());
}

#[test]
fn restore_of_unknown_backup_name_is_a_runtime_error() {
    let target = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    run_increbak()
        .arg("restore")
        .arg(target.path())
        .arg(dest.path())
        .arg("--backup")
        .arg("doesnotexist")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn conflicting_selection_flags_are_an_argument_error() {
    let target = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    run_increbak()
        .arg("restore")
        .arg(target.path())
        .arg(dest.path())
        .arg("--backup")
        .arg("whatever")
        .arg("--before")
        .arg("2024-01-01T00:00:00")
        .assert()
        .failure()
        .code(1);
}
