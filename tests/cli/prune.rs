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
use predicates::prelude::*;
use tempfile::TempDir;

use crate::run_increbak;

#[test]
fn dry_run_reports_without_deleting() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    // Source is empty: the backup itself will be empty.
    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .success();

    run_increbak()
        .arg("prune")
        .arg(target.path())
        .arg("--empty")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 backups would be deleted"));

    assert_eq!(fs::read_dir(target.path()).unwrap().count(), 1);
}

#[test]
fn commit_deletes_prunable_backups() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .success();

    run_increbak()
        .arg("prune")
        .arg(target.path())
        .arg("--commit")
        .arg("--empty")
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted 1 backups"));

    assert_eq!(fs::read_dir(target.path()).unwrap().count(), 0);
}

#[test]
fn useful_backup_is_never_deleted() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    fs::write(source.path().join("a"), b"hi").unwrap();
    run_increbak()
        .arg("backup")
        .arg(source.path())
        .arg(target.path())
        .assert()
        .success();

    run_increbak()
        .arg("prune")
        .arg(target.path())
        .arg("--commit")
        .arg("--empty")
        .arg("--other-data")
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted 0 backups"));

    assert_eq!(fs::read_dir(target.path()).unwrap().count(), 1);
}

#[test]
fn no_options_is_an_argument_error() {
    let target = TempDir::new().unwrap();
    run_increbak()
        .arg("prune")
        .arg(target.path())
        .assert()
        .failure()
        .code(1);
}
