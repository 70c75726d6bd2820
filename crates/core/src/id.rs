// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier types for jobs and targets.
//!
//! Unlike an opaque generated id, a [`JobId`] is a human-authored slug (§3:
//! "identifier: slug of target, suffixed on collision; validated character
//! set"), so the type enforces the character set at construction instead of
//! at the point of generation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters allowed in a job or target identifier: ASCII alphanumerics,
/// `-` and `_`.
fn is_valid_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Error returned when a candidate id/slug fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidId {
    #[error("id must not be empty")]
    Empty,
    #[error("id {0:?} contains character {1:?} outside [A-Za-z0-9_-]")]
    InvalidChar(String, char),
}

fn validate(raw: &str) -> Result<(), InvalidId> {
    if raw.is_empty() {
        return Err(InvalidId::Empty);
    }
    if let Some(c) = raw.chars().find(|c| !is_valid_id_char(*c)) {
        return Err(InvalidId::InvalidChar(raw.to_string(), c));
    }
    Ok(())
}

macro_rules! define_slug_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap a candidate identifier.
            pub fn new(raw: impl Into<String>) -> Result<Self, InvalidId> {
                let raw = raw.into();
                validate(&raw)?;
                Ok(Self(raw))
            }

            /// Derive a job/target id from a target's display name by slugifying it:
            /// non-id characters become `-`, runs collapse, edges trim.
            pub fn slugify(name: &str) -> Self {
                let mut out = String::with_capacity(name.len());
                let mut last_dash = false;
                for c in name.chars() {
                    if is_valid_id_char(c) {
                        out.push(c);
                        last_dash = false;
                    } else if !last_dash {
                        out.push('-');
                        last_dash = true;
                    }
                }
                let trimmed = out.trim_matches('-');
                let trimmed = if trimmed.is_empty() { "job" } else { trimmed };
                Self(trimmed.to_string())
            }

            /// Suffix this id to resolve a collision, e.g. `name` -> `name-2`.
            pub fn with_suffix(&self, n: u32) -> Self {
                Self(format!("{}-{}", self.0, n))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidId;
            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = InvalidId;
            fn try_from(raw: &str) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }
    };
}

define_slug_id!(
    /// Identifier of a [`crate::Job`]. A validated slug, not an opaque id.
    JobId
);

define_slug_id!(
    /// Identifier/name of a [`crate::Target`].
    TargetId
);

/// Given a proposed base id and a predicate testing whether a candidate is
/// already taken, return the first of `base`, `base-2`, `base-3`, ... that is
/// free. Matches §3's "suffixed on collision" rule.
pub fn first_free<F: Fn(&JobId) -> bool>(base: JobId, exists: F) -> JobId {
    if !exists(&base) {
        return base;
    }
    let mut n = 2u32;
    loop {
        let candidate = base.with_suffix(n);
        if !exists(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
