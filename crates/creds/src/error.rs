// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#[derive(Debug, thiserror::Error)]
pub enum CredsError {
    #[error("generating key pair: {0}")]
    KeyGen(#[from] rcgen::Error),
    #[error("bootstrap request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server rejected bootstrap: {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("reading credential store at {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("writing credential store at {path}: {source}")]
    Write { path: String, source: std::io::Error },
    #[error("parsing credential store at {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
    #[error("serialising credential store: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no bootstrap token configured and no existing credentials on disk")]
    NotBootstrapped,
}
