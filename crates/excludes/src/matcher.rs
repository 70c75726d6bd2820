// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compiles a job's [`Exclusion`] list (own plus applicable global entries,
//! see `Job::applicable_exclusions`) into an ordered [`Pattern`] list and
//! decides, for a given relative path, whether it should be skipped (§4.10).
//!
//! Patterns are evaluated in declaration order; a `!`-negated pattern that
//! matches later than an excluding pattern re-includes the path. This makes
//! the matcher well-defined for any input: later patterns always win.

use crate::pattern::Pattern;
use crate::token::TokenizeError;
use d2d_core::Exclusion;

pub struct ExclusionMatcher {
    patterns: Vec<Pattern>,
}

impl ExclusionMatcher {
    /// Compile `exclusions` in order. A malformed pattern is skipped rather
    /// than aborting the whole job; callers should log the error.
    pub fn compile(exclusions: &[&Exclusion]) -> (Self, Vec<(String, TokenizeError)>) {
        let mut patterns = Vec::with_capacity(exclusions.len());
        let mut errors = Vec::new();
        for exclusion in exclusions {
            match Pattern::compile(&exclusion.pattern) {
                Ok(p) => patterns.push(p),
                Err(e) => errors.push((exclusion.pattern.clone(), e)),
            }
        }
        (Self { patterns }, errors)
    }

    /// Whether `relative_path` (relative to the source root, no leading
    /// slash) is excluded. Backslashes are normalised to forward slashes
    /// before splitting, so callers may pass either separator (§4.10/§6.3).
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        let normalized = relative_path.replace('\\', "/");
        let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
        let mut excluded = false;
        for pattern in &self.patterns {
            if pattern.matches(&segments) {
                excluded = !pattern.negate;
            }
        }
        excluded
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
