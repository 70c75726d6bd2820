// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashSet;

#[test]
fn rejects_empty() {
    assert_eq!(JobId::new(""), Err(InvalidId::Empty));
}

#[test]
fn rejects_invalid_chars() {
    assert!(JobId::new("has space").is_err());
    assert!(JobId::new("slash/es").is_err());
    assert!(JobId::new("colon:s").is_err());
}

#[test]
fn accepts_alnum_dash_underscore() {
    assert!(JobId::new("my-job_01").is_ok());
}

#[test]
fn slugify_collapses_and_trims() {
    assert_eq!(JobId::slugify("My Target (prod)").as_str(), "My-Target-prod");
    assert_eq!(JobId::slugify("  leading").as_str(), "leading");
    assert_eq!(JobId::slugify("***").as_str(), "job");
}

#[test]
fn with_suffix_formats_n() {
    let base = JobId::new("web01").unwrap();
    assert_eq!(base.with_suffix(2).as_str(), "web01-2");
}

#[test]
fn first_free_returns_base_when_unused() {
    let taken: HashSet<JobId> = HashSet::new();
    let id = first_free(JobId::new("web01").unwrap(), |c| taken.contains(c));
    assert_eq!(id.as_str(), "web01");
}

#[test]
fn first_free_suffixes_on_collision() {
    let mut taken: HashSet<JobId> = HashSet::new();
    taken.insert(JobId::new("web01").unwrap());
    taken.insert(JobId::new("web01-2").unwrap());
    let id = first_free(JobId::new("web01").unwrap(), |c| taken.contains(c));
    assert_eq!(id.as_str(), "web01-3");
}

#[test]
fn borrow_str_allows_hashmap_lookup_by_str() {
    use std::collections::HashMap;
    let mut map: HashMap<JobId, u32> = HashMap::new();
    map.insert(JobId::new("web01").unwrap(), 1);
    assert_eq!(map.get("web01"), Some(&1));
}
