// ABOUTME: Cluster connection error types.
// ABOUTME: Covers malformed server URLs, resource locators, upgrade requests, and TLS material.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("invalid server url {url}: {reason}")]
    InvalidServer { url: String, reason: String },

    #[error("invalid resource locator: {0}")]
    InvalidLocator(String),

    #[error("failed to build upgrade request: {0}")]
    UpgradeRequest(String),

    #[error("invalid TLS configuration: {0}")]
    Tls(String),
}

pub type Result<T> = std::result::Result<T, ClusterError>;
