// ABOUTME: Connection provider for the cluster API server.
// ABOUTME: Resource addressing plus the transport config needed for stream upgrades.

mod connection;
mod error;
mod request;
mod tls;

pub use connection::ClusterConnection;
pub use error::ClusterError;
pub use request::{QueryParams, ResourceRequest};
pub use tls::rustls_connector;
pub use tokio_tungstenite::Connector;
