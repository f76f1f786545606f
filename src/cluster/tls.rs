// ABOUTME: TLS connector for clusters signed by a private certificate authority.
// ABOUTME: Builds a rustls client config from PEM roots and an optional client identity.

use super::error::{ClusterError, Result};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore};
use std::sync::Arc;
use tokio_tungstenite::Connector;

/// Build a connector that trusts only the certificates in `ca_pem`.
///
/// `identity` is a PEM certificate chain and its private key, presented to
/// API servers that authenticate clients by certificate.
pub fn rustls_connector(ca_pem: &[u8], identity: Option<(&[u8], &[u8])>) -> Result<Connector> {
    let mut roots = RootCertStore::empty();
    for cert in certificates(ca_pem, "certificate authority")? {
        roots
            .add(cert)
            .map_err(|e| ClusterError::Tls(format!("invalid certificate authority: {}", e)))?;
    }

    let builder =
        ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .map_err(|e| ClusterError::Tls(e.to_string()))?
            .with_root_certificates(roots);

    let config = match identity {
        Some((cert_pem, key_pem)) => {
            let chain = certificates(cert_pem, "client certificate")?;
            let key = PrivateKeyDer::from_pem_slice(key_pem)
                .map_err(|e| ClusterError::Tls(format!("invalid client key: {}", e)))?;
            builder
                .with_client_auth_cert(chain, key)
                .map_err(|e| ClusterError::Tls(format!("invalid client identity: {}", e)))?
        }
        None => builder.with_no_client_auth(),
    };

    Ok(Connector::Rustls(Arc::new(config)))
}

fn certificates(pem: &[u8], what: &str) -> Result<Vec<CertificateDer<'static>>> {
    let certs = CertificateDer::pem_slice_iter(pem)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| ClusterError::Tls(format!("invalid {}: {}", what, e)))?;
    if certs.is_empty() {
        return Err(ClusterError::Tls(format!("no PEM certificates in {}", what)));
    }
    Ok(certs)
}
