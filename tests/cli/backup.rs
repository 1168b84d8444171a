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

fn one_backup_dir(target: &std::path::Path) -> std::path::PathBuf {
    let mut entries: Vec<_> = fs::read_dir(target)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1, "expected exactly one backup directory");
    entries.pop().unwrap()
}

#[test]
fn first_backup_copies_everything() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    fs::write(source.path().join("foo.txt"), b"hi").unwrap();
    fs::create_dir(source.path().join("bar")).unwrap();
    fs::write(source.path().join("bar").join("qux"), b"q").unwrap();

    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("+2 / -0 files"));

    let backup_dir = one_backup_dir(target.path());
    assert_eq!(backup_dir.file_name().unwrap().to_string_lossy().len(), 16);
    let data = backup_dir.join("data");
    assert_eq!(fs::read(data.join("foo.txt")).unwrap(), b"hi");
    assert_eq!(fs::read(data.join("bar").join("qux")).unwrap(), b"q");
    assert!(backup_dir.join("start.json").is_file());
    assert!(backup_dir.join("manifest.json").is_file());
    assert!(backup_dir.join("completion.json").is_file());
}

#[test]
fn unchanged_file_is_not_recopied() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    fs::write(source.path().join("a"), b"v1").unwrap();

    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .success();

    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("+0 / -0 files"));

    assert_eq!(fs::read_dir(target.path()).unwrap().count(), 2);
}

#[test]
fn modified_file_is_recopied() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let file = source.path().join("a");
    fs::write(&file, b"v1").unwrap();

    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .success();

    // Force the mtime to be unambiguously after the first backup's start
    // time, regardless of filesystem timestamp resolution.
    fs::write(&file, b"v2-longer").unwrap();
    set_mtime(&file, Utc::now().timestamp() + 86_400);

    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("+1 / -0 files"));
}

#[test]
fn removed_file_and_directory_are_recorded() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    fs::write(source.path().join("old"), b"x").unwrap();
    fs::create_dir(source.path().join("gone")).unwrap();
    fs::write(source.path().join("gone").join("inner"), b"y").unwrap();

    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .success();

    fs::remove_file(source.path().join("old")).unwrap();
    fs::remove_dir_all(source.path().join("gone")).unwrap();

    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("+0 / -1 files"));
}

#[test]
fn nonexistent_source_is_an_argument_error() {
    let target = TempDir::new().unwrap();
    run_increbak()
        .arg("backup")
        .arg("/does/not/exist")
        .arg(target.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("source directory"));
}
