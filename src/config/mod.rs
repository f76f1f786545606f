// ABOUTME: Cluster configuration types and parsing for podexec.yml.
// ABOUTME: Handles YAML parsing, token interpolation, TLS material, and context overrides.

mod deserialize;
mod env_value;
mod pem_source;

pub use env_value::EnvValue;
pub use pem_source::PemSource;

use crate::error::{Error, Result};
use deserialize::{deserialize_server, deserialize_server_option};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "podexec.yml";
pub const CONFIG_FILENAME_ALT: &str = "podexec.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".podexec/config.yml";

/// Default execution timeout applied when neither the request nor config sets one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    /// API server base URL, e.g. `https://10.0.0.1:6443`.
    #[serde(deserialize_with = "deserialize_server")]
    pub server: String,

    /// Bearer token, literal or read from the environment.
    #[serde(default)]
    pub token: Option<EnvValue>,

    /// Default namespace for commands that don't name one.
    #[serde(default)]
    pub namespace: String,

    /// Default container for commands that don't name one.
    #[serde(default)]
    pub container: String,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// CA bundle the API server certificate must chain to. Without one,
    /// `https` servers are checked against the web PKI roots.
    #[serde(default)]
    pub certificate_authority: Option<PemSource>,

    /// Client certificate chain for certificate authentication.
    #[serde(default)]
    pub client_certificate: Option<PemSource>,

    #[serde(default)]
    pub client_key: Option<PemSource>,

    #[serde(default)]
    pub contexts: HashMap<String, Context>,
}

/// Named override of connection settings.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Context {
    #[serde(default, deserialize_with = "deserialize_server_option")]
    pub server: Option<String>,

    #[serde(default)]
    pub token: Option<EnvValue>,

    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub container: Option<String>,

    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    #[serde(default)]
    pub certificate_authority: Option<PemSource>,

    #[serde(default)]
    pub client_certificate: Option<PemSource>,

    #[serde(default)]
    pub client_key: Option<PemSource>,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl ClusterConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    /// Load a config file. Relative PEM paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        if let Some(dir) = path.parent() {
            config.rebase_paths(dir);
        }
        Ok(config)
    }

    fn rebase_paths(&mut self, dir: &Path) {
        let contexts = self.contexts.values_mut().flat_map(|c| {
            [
                &mut c.certificate_authority,
                &mut c.client_certificate,
                &mut c.client_key,
            ]
        });
        let top = [
            &mut self.certificate_authority,
            &mut self.client_certificate,
            &mut self.client_key,
        ];
        for source in top.into_iter().chain(contexts).flatten() {
            source.rebase(dir);
        }
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Apply a named context on top of the base settings.
    pub fn for_context(&self, name: &str) -> Result<ClusterConfig> {
        let context = self
            .contexts
            .get(name)
            .ok_or_else(|| Error::UnknownContext(name.to_string()))?;

        let mut merged = self.clone();

        if let Some(ref server) = context.server {
            merged.server = server.clone();
        }
        if context.token.is_some() {
            merged.token = context.token.clone();
        }
        if let Some(ref namespace) = context.namespace {
            merged.namespace = namespace.clone();
        }
        if let Some(ref container) = context.container {
            merged.container = container.clone();
        }
        if let Some(timeout) = context.timeout {
            merged.timeout = timeout;
        }
        if context.certificate_authority.is_some() {
            merged.certificate_authority = context.certificate_authority.clone();
        }
        if context.client_certificate.is_some() {
            merged.client_certificate = context.client_certificate.clone();
        }
        if context.client_key.is_some() {
            merged.client_key = context.client_key.clone();
        }

        Ok(merged)
    }
}
