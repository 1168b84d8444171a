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

//! Run increbak's CLI binary as a subprocess and test it end-to-end.

use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

mod backup;
mod exclude;
mod prune;
mod restore;

fn run_increbak() -> Command {
    Command::cargo_bin("increbak").expect("locate increbak binary")
}

#[test]
fn no_args() {
    run_increbak()
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn help() {
    run_increbak()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("incremental backup"));
}
