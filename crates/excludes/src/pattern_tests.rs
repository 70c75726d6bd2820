// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn segs(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[test]
fn literal_pattern_matches_exact_path() {
    let p = Pattern::compile("etc/passwd").unwrap();
    assert!(p.matches(&segs("etc/passwd")));
    assert!(!p.matches(&segs("etc/shadow")));
}

#[test]
fn star_matches_within_single_segment_only() {
    let p = Pattern::compile("*.tmp").unwrap();
    assert!(p.matches(&segs("file.tmp")));
    assert!(!p.matches(&segs("dir/file.tmp")), "single * must not cross a path separator");
}

#[test]
fn double_star_matches_any_depth() {
    let p = Pattern::compile("**/*.tmp").unwrap();
    assert!(p.matches(&segs("file.tmp")));
    assert!(p.matches(&segs("a/b/c/file.tmp")));
    assert!(!p.matches(&segs("a/b/c/file.log")));
}

#[test]
fn double_star_in_the_middle_matches_zero_or_more_segments() {
    let p = Pattern::compile("a/**/z").unwrap();
    assert!(p.matches(&segs("a/z")));
    assert!(p.matches(&segs("a/b/z")));
    assert!(p.matches(&segs("a/b/c/z")));
    assert!(!p.matches(&segs("a/b/c")));
}

#[test]
fn question_mark_matches_exactly_one_char() {
    let p = Pattern::compile("log?.txt").unwrap();
    assert!(p.matches(&segs("log1.txt")));
    assert!(!p.matches(&segs("log12.txt")));
}

#[test]
fn bracket_class_restricts_match() {
    let p = Pattern::compile("file[0-9].txt").unwrap();
    assert!(p.matches(&segs("file3.txt")));
    assert!(!p.matches(&segs("fileA.txt")));
}

#[test]
fn matching_is_case_insensitive() {
    let p = Pattern::compile("*.LOG").unwrap();
    assert!(p.matches(&segs("app.log")));
}

#[test]
fn leading_bang_marks_pattern_as_negated() {
    let p = Pattern::compile("!important.tmp").unwrap();
    assert!(p.negate);
    assert!(p.matches(&segs("important.tmp")));
}

#[test]
fn brace_expansion_fails_to_compile() {
    assert!(Pattern::compile("*.{tmp,bak}").is_err());
}
