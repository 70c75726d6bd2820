// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutual TLS setup (§6.1): "Client and server both authenticate with
//! certificates chained to the server-held CA." Certificate material is
//! handed in as PEM text (as produced by `d2d-creds::CredentialStore`); this
//! module only turns that into `rustls` configs.

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore, ServerConfig};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TlsSetupError {
    #[error("parsing PEM: {0}")]
    Pem(#[from] std::io::Error),
    #[error("no certificate found in PEM text")]
    NoCert,
    #[error("no private key found in PEM text")]
    NoKey,
    #[error("rustls config: {0}")]
    Rustls(#[from] rustls::Error),
    #[error("building client cert verifier: {0}")]
    Verifier(#[from] rustls::server::VerifierBuilderError),
}

fn parse_certs(pem: &str) -> Result<Vec<CertificateDer<'static>>, TlsSetupError> {
    let certs = rustls_pemfile::certs(&mut pem.as_bytes()).collect::<Result<Vec<_>, _>>()?;
    if certs.is_empty() {
        return Err(TlsSetupError::NoCert);
    }
    Ok(certs)
}

fn parse_key(pem: &str) -> Result<PrivateKeyDer<'static>, TlsSetupError> {
    rustls_pemfile::private_key(&mut pem.as_bytes())?.ok_or(TlsSetupError::NoKey)
}

fn root_store(ca_pem: &str) -> Result<RootCertStore, TlsSetupError> {
    let mut roots = RootCertStore::empty();
    for cert in parse_certs(ca_pem)? {
        roots.add(cert).map_err(|_| TlsSetupError::NoCert)?;
    }
    Ok(roots)
}

/// The agent's outbound `ClientConfig`: authenticates itself with its own
/// certificate and verifies the server against the shared CA.
pub fn client_config(cert_pem: &str, key_pem: &str, ca_pem: &str) -> Result<ClientConfig, TlsSetupError> {
    let roots = root_store(ca_pem)?;
    let certs = parse_certs(cert_pem)?;
    let key = parse_key(key_pem)?;
    Ok(ClientConfig::builder()
        .with_root_certificates(roots)
        .with_client_auth_cert(certs, key)?)
}

/// The coordinator's `ServerConfig`: requires every connecting agent to
/// present a certificate chained to the CA (the agent's CN becomes its
/// identity, per §4.13).
pub fn server_config(cert_pem: &str, key_pem: &str, ca_pem: &str) -> Result<ServerConfig, TlsSetupError> {
    let roots = Arc::new(root_store(ca_pem)?);
    let verifier = rustls::server::WebPkiClientVerifier::builder(roots).build()?;
    let certs = parse_certs(cert_pem)?;
    let key = parse_key(key_pem)?;
    Ok(ServerConfig::builder()
        .with_client_cert_verifier(verifier)
        .with_single_cert(certs, key)?)
}

#[cfg(test)]
#[path = "tls_tests.rs"]
mod tests;
