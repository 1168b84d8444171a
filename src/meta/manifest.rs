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

//! The manifest: a per-backup record of copied and removed paths,
//! relative to the state established by all prior backups.
//!
//! On disk a manifest is a flat JSON array: a pre-order, depth-first
//! traversal of the manifest tree, with runs of "ascend one level" steps
//! collapsed into a single `"^k"` backtrack token. Trailing backtracks (the
//! ones that would walk back up to, and past, the root) are omitted
//! entirely.

use std::path::Path;

use serde_json::Value;

use crate::errors::Error;
use crate::pathname::names_equal;
use crate::Result;

/// One directory's worth of changes recorded by a backup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDirectory {
    pub name: String,
    pub copied_files: Vec<String>,
    pub removed_files: Vec<String>,
    pub removed_directories: Vec<String>,
    pub subdirectories: Vec<ManifestDirectory>,
}

impl ManifestDirectory {
    pub fn root() -> ManifestDirectory {
        ManifestDirectory::default()
    }

    pub fn named(name: impl Into<String>) -> ManifestDirectory {
        ManifestDirectory {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_empty_entry(&self) -> bool {
        self.copied_files.is_empty()
            && self.removed_files.is_empty()
            && self.removed_directories.is_empty()
    }

    /// True if this directory and everything beneath it carries no
    /// payload at all.
    pub fn is_empty_tree(&self) -> bool {
        self.is_empty_entry() && self.subdirectories.iter().all(|d| d.is_empty_tree())
    }

    fn child_index(&self, name: &str) -> Option<usize> {
        self.subdirectories
            .iter()
            .position(|d| names_equal(&d.name, name))
    }
}

/// Serialize a manifest tree to its flat, backtrack-compressed JSON form.
pub fn encode(root: &ManifestDirectory) -> Value {
    let mut entries = vec![dir_entry_json(root)];
    // Stack of (node, index of next child to visit).
    let mut stack: Vec<(&ManifestDirectory, usize)> = vec![(root, 0)];
    let mut pending_backtracks: u32 = 0;

    loop {
        let (node, idx) = stack.last().unwrap();
        if *idx < node.subdirectories.len() {
            let child = &node.subdirectories[*idx];
            let next_idx = *idx + 1;
            let last = stack.len() - 1;
            stack[last].1 = next_idx;
            if pending_backtracks > 0 {
                entries.push(Value::String(format!("^{}", pending_backtracks)));
                pending_backtracks = 0;
            }
            entries.push(dir_entry_json(child));
            stack.push((child, 0));
        } else {
            stack.pop();
            if stack.is_empty() {
                break;
            }
            pending_backtracks += 1;
        }
    }
    Value::Array(entries)
}

fn dir_entry_json(dir: &ManifestDirectory) -> Value {
    let mut map = serde_json::Map::new();
    map.insert("n".to_string(), Value::String(dir.name.clone()));
    if !dir.copied_files.is_empty() {
        map.insert("cf".to_string(), string_array(&dir.copied_files));
    }
    if !dir.removed_files.is_empty() {
        map.insert("rf".to_string(), string_array(&dir.removed_files));
    }
    if !dir.removed_directories.is_empty() {
        map.insert("rd".to_string(), string_array(&dir.removed_directories));
    }
    Value::Object(map)
}

fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

/// Parse a manifest from its flat JSON form.
pub fn decode(value: &Value) -> std::result::Result<ManifestDirectory, String> {
    let entries = value
        .as_array()
        .ok_or_else(|| "manifest is not a JSON array".to_string())?;

    // We build the tree through a stack of owned directories so we can
    // mutate the one currently "open"; the finished subtree is spliced
    // back into its parent on backtrack.
    let mut stack: Vec<ManifestDirectory> = Vec::new();
    let mut first = true;

    for entry in entries {
        match entry {
            Value::Object(map) => {
                for key in map.keys() {
                    if !matches!(key.as_str(), "n" | "cf" | "rf" | "rd") {
                        return Err(format!("unknown manifest field {:?}", key));
                    }
                }
                let name = match map.get("n") {
                    Some(Value::String(s)) => s.clone(),
                    Some(_) => return Err("field \"n\" must be a string".to_string()),
                    None if first => String::new(),
                    None => return Err("missing field \"n\"".to_string()),
                };
                let cf = string_list(map.get("cf"), "cf")?;
                let rf = string_list(map.get("rf"), "rf")?;
                let rd = string_list(map.get("rd"), "rd")?;

                if first {
                    let mut root = ManifestDirectory::root();
                    root.copied_files = cf;
                    root.removed_files = rf;
                    root.removed_directories = rd;
                    stack.push(root);
                    first = false;
                    continue;
                }

                let parent = stack.last_mut().expect("stack non-empty after first entry");
                match parent.child_index(&name) {
                    Some(i) => {
                        let existing = std::mem::take(&mut parent.subdirectories[i]);
                        parent.subdirectories.remove(i);
                        let mut reentered = existing;
                        reentered.copied_files.extend(cf);
                        reentered.removed_files.extend(rf);
                        reentered.removed_directories.extend(rd);
                        stack.push(reentered);
                    }
                    None => {
                        let mut child = ManifestDirectory::named(name);
                        child.copied_files = cf;
                        child.removed_files = rf;
                        child.removed_directories = rd;
                        stack.push(child);
                    }
                }
            }
            Value::String(s) => {
                if first {
                    return Err("manifest must begin with a directory entry".to_string());
                }
                let k = s
                    .strip_prefix('^')
                    .and_then(|rest| rest.parse::<usize>().ok())
                    .filter(|k| *k >= 1)
                    .ok_or_else(|| format!("malformed backtrack token {:?}", s))?;
                if k > stack.len() - 1 {
                    return Err(format!(
                        "backtrack {:?} would pop past the root (stack depth {})",
                        s,
                        stack.len()
                    ));
                }
                for _ in 0..k {
                    let finished = stack.pop().expect("checked depth above");
                    let parent = stack.last_mut().expect("checked depth above");
                    parent.subdirectories.push(finished);
                }
            }
            _ => return Err("manifest entry must be an object or a backtrack string".to_string()),
        }
    }
    if first {
        return Err("manifest is empty".to_string());
    }
    // Fold any still-open directories back up to the root.
    while stack.len() > 1 {
        let finished = stack.pop().unwrap();
        stack.last_mut().unwrap().subdirectories.push(finished);
    }
    Ok(stack.pop().expect("root always present"))
}

fn string_list(value: Option<&Value>, field: &str) -> std::result::Result<Vec<String>, String> {
    match value {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| format!("field {:?} must be an array of strings", field))
            })
            .collect(),
        Some(_) => Err(format!("field {:?} must be an array of strings", field)),
    }
}

pub fn write(root: &ManifestDirectory, path: &Path) -> Result<()> {
    let value = encode(root);
    let json = serde_json::to_string(&value).expect("manifest always serializes");
    std::fs::write(path, json).map_err(|source| Error::WriteFile {
        path: path.to_owned(),
        source,
    })
}

pub fn read(path: &Path) -> Result<ManifestDirectory> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::ReadFile {
        path: path.to_owned(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| Error::ParseJson {
        path: path.to_owned(),
        source,
    })?;
    decode(&value).map_err(|reason| Error::ParseManifest {
        path: path.to_owned(),
        reason,
    })
}
