// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secure-join (§4.9.2): joins a client-supplied path to the snapshot root
//! and rejects any result that would escape it — no `..` traversal, no
//! absolute-path override, symlink components resolved within the root.

use d2d_core::CoreError;
use std::fs;
use std::path::{Path, PathBuf};

/// Joins `requested` to `root`, resolving symlinks along the way and
/// refusing to leave `root`. `""`/`"."` resolve to `root` itself.
pub fn secure_join(root: &Path, requested: &str) -> Result<PathBuf, CoreError> {
    let requested = requested.trim_start_matches(['/', '\\']);
    if requested.is_empty() || requested == "." {
        return canonicalize_root(root);
    }

    let root_real = canonicalize_root(root)?;
    let mut current = root_real.clone();

    for component in requested.split(['/', '\\']) {
        if component.is_empty() || component == "." {
            continue;
        }
        if component == ".." {
            // Climbing above root is a no-op, not an error: the root is
            // the effective filesystem floor for this client.
            if current != root_real {
                current.pop();
            }
            continue;
        }
        current.push(component);
        if let Ok(resolved) = fs::canonicalize(&current) {
            current = resolved;
        }
        if !current.starts_with(&root_real) {
            return Err(CoreError::permission("secure_join", requested));
        }
    }

    if !current.starts_with(&root_real) {
        return Err(CoreError::permission("secure_join", requested));
    }
    Ok(current)
}

fn canonicalize_root(root: &Path) -> Result<PathBuf, CoreError> {
    fs::canonicalize(root).map_err(|_| CoreError::not_exist(root.display().to_string()))
}

#[cfg(test)]
#[path = "path_safety_tests.rs"]
mod tests;
