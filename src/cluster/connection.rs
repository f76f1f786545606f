// ABOUTME: Long-lived handle to a cluster API server.
// ABOUTME: Builds resource requests and the authenticated WebSocket upgrade for them.

use super::error::{ClusterError, Result};
use super::request::ResourceRequest;
use super::tls::rustls_connector;
use crate::config::ClusterConfig;
use tokio_tungstenite::Connector;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::{AUTHORIZATION, SEC_WEBSOCKET_PROTOCOL};

/// Connection to a cluster API server.
///
/// Read-only once built; share it behind an `Arc` across any number of
/// concurrent executions. Each execution opens its own stream over it.
pub struct ClusterConnection {
    server: String,
    token: Option<String>,
    connector: Option<Connector>,
}

impl std::fmt::Debug for ClusterConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterConnection")
            .field("server", &self.server)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("connector", &self.connector.as_ref().map(|_| "<tls>"))
            .finish()
    }
}

impl ClusterConnection {
    /// Create a connection to `server` (an `http://` or `https://` base URL).
    pub fn new(server: impl Into<String>) -> Result<Self> {
        let server = server.into();
        if !(server.starts_with("https://") || server.starts_with("http://")) {
            return Err(ClusterError::InvalidServer {
                url: server,
                reason: "scheme must be http or https".to_string(),
            });
        }
        let host = server.split_once("://").map(|(_, rest)| rest).unwrap_or("");
        if host.trim_end_matches('/').is_empty() {
            return Err(ClusterError::InvalidServer {
                url: server,
                reason: "missing host".to_string(),
            });
        }

        Ok(Self {
            server,
            token: None,
            connector: None,
        })
    }

    /// Build a connection from a loaded config file.
    pub fn from_config(config: &ClusterConfig) -> crate::error::Result<Self> {
        let mut connection = Self::new(config.server.clone())?;
        if let Some(token) = &config.token {
            connection = connection.bearer_token(token.resolve()?);
        }
        if let Some(connector) = connector_from_config(config)? {
            connection = connection.tls_connector(connector);
        }
        Ok(connection)
    }

    /// Authenticate every request with a bearer token.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Use a custom TLS connector (cluster CA, client certificates).
    ///
    /// Without one, `https` servers are verified against the bundled web PKI roots.
    pub fn tls_connector(mut self, connector: Connector) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Base server URL.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Start a resource request against this server.
    pub fn request(&self) -> ResourceRequest<'_> {
        ResourceRequest::new(&self.server)
    }

    /// Turn a resource URL into an authenticated WebSocket upgrade request.
    pub(crate) fn upgrade_request(&self, url: &str, protocol: &str) -> Result<Request> {
        let ws_url = websocket_url(url)?;
        let mut request = ws_url
            .into_client_request()
            .map_err(|e| ClusterError::UpgradeRequest(e.to_string()))?;

        let headers = request.headers_mut();
        headers.insert(
            SEC_WEBSOCKET_PROTOCOL,
            HeaderValue::from_str(protocol)
                .map_err(|e| ClusterError::UpgradeRequest(e.to_string()))?,
        );
        if let Some(token) = &self.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClusterError::UpgradeRequest("invalid bearer token".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(request)
    }

    pub(crate) fn connector(&self) -> Option<Connector> {
        self.connector.clone()
    }
}

fn connector_from_config(config: &ClusterConfig) -> crate::error::Result<Option<Connector>> {
    let identity = match (&config.client_certificate, &config.client_key) {
        (Some(cert), Some(key)) => Some((cert.read()?, key.read()?)),
        (None, None) => None,
        _ => {
            return Err(ClusterError::Tls(
                "client_certificate and client_key must be set together".to_string(),
            )
            .into());
        }
    };

    let Some(ca) = &config.certificate_authority else {
        if identity.is_some() {
            return Err(ClusterError::Tls(
                "client_certificate requires certificate_authority".to_string(),
            )
            .into());
        }
        return Ok(None);
    };

    let ca = ca.read()?;
    let identity = identity
        .as_ref()
        .map(|(cert, key)| (cert.as_slice(), key.as_slice()));
    Ok(Some(rustls_connector(&ca, identity)?))
}

fn websocket_url(url: &str) -> Result<String> {
    if let Some(rest) = url.strip_prefix("https://") {
        Ok(format!("wss://{}", rest))
    } else if let Some(rest) = url.strip_prefix("http://") {
        Ok(format!("ws://{}", rest))
    } else {
        Err(ClusterError::InvalidLocator(format!(
            "unsupported url scheme: {}",
            url
        )))
    }
}
