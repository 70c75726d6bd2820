// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key pair and CSR generation for credential bootstrap/renewal (§4.6).

use crate::error::CredsError;
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};

/// A freshly generated key pair plus the PEM-encoded CSR for it.
pub struct CsrMaterial {
    pub key_pair_pem: String,
    pub csr_pem: String,
}

/// Generate a new key pair and a CSR naming `common_name` as the subject —
/// conventionally the agent's hostname, which becomes the session key the
/// server's `SessionManager` uses to identify this agent (§4.13).
pub fn generate_csr(common_name: &str) -> Result<CsrMaterial, CredsError> {
    let key_pair = KeyPair::generate()?;
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;
    let csr = params.serialize_request(&key_pair)?;
    Ok(CsrMaterial { key_pair_pem: key_pair.serialize_pem(), csr_pem: csr.pem()? })
}

#[cfg(test)]
#[path = "csr_tests.rs"]
mod tests;
