// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use d2d_core::Exclusion;

#[test]
fn path_excluded_when_any_pattern_matches() {
    let excl = vec![Exclusion::global("**/*.tmp", "")];
    let refs: Vec<&Exclusion> = excl.iter().collect();
    let (matcher, errors) = ExclusionMatcher::compile(&refs);
    assert!(errors.is_empty());
    assert!(matcher.is_excluded("cache/session.tmp"));
    assert!(!matcher.is_excluded("cache/session.txt"));
}

#[test]
fn later_negation_overrides_earlier_exclusion() {
    let excl = vec![
        Exclusion::global("logs/**", ""),
        Exclusion::global("!logs/keep.txt", ""),
    ];
    let refs: Vec<&Exclusion> = excl.iter().collect();
    let (matcher, _) = ExclusionMatcher::compile(&refs);
    assert!(matcher.is_excluded("logs/other.txt"));
    assert!(!matcher.is_excluded("logs/keep.txt"));
}

#[test]
fn earlier_negation_does_not_override_later_exclusion() {
    let excl = vec![
        Exclusion::global("!logs/keep.txt", ""),
        Exclusion::global("logs/**", ""),
    ];
    let refs: Vec<&Exclusion> = excl.iter().collect();
    let (matcher, _) = ExclusionMatcher::compile(&refs);
    assert!(matcher.is_excluded("logs/keep.txt"), "order matters: later pattern wins");
}

#[test]
fn malformed_pattern_is_reported_but_does_not_abort_compilation() {
    let excl = vec![Exclusion::global("*.{a,b}", ""), Exclusion::global("*.tmp", "")];
    let refs: Vec<&Exclusion> = excl.iter().collect();
    let (matcher, errors) = ExclusionMatcher::compile(&refs);
    assert_eq!(errors.len(), 1);
    assert!(matcher.is_excluded("x.tmp"));
}

#[test]
fn no_patterns_excludes_nothing() {
    let (matcher, _) = ExclusionMatcher::compile(&[]);
    assert!(!matcher.is_excluded("anything"));
}

#[test]
fn backslashes_in_pattern_and_path_are_normalised_before_matching() {
    let excl = vec![Exclusion::global("AppData\\Local\\Temp**", "")];
    let refs: Vec<&Exclusion> = excl.iter().collect();
    let (matcher, errors) = ExclusionMatcher::compile(&refs);
    assert!(errors.is_empty());
    assert!(matcher.is_excluded("Users/alice/AppData/Local/Temp/foo/bar.tmp"));
    assert!(matcher.is_excluded("Users\\alice\\AppData\\Local\\Temp\\foo\\bar.tmp"));
}
