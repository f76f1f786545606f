// ABOUTME: Resource request builder for the cluster API surface.
// ABOUTME: Forms namespaced resource paths with sub-resources and versioned query params.

use super::error::{ClusterError, Result};
use std::time::Duration;

const API_PREFIX: &str = "/api/v1";

/// Types that serialize themselves as versioned query parameters.
pub trait QueryParams {
    /// Append `(key, value)` pairs in wire order.
    fn append_to(&self, query: &mut Vec<(&'static str, String)>);
}

/// Builder for a single core API resource request.
///
/// Mirrors the usual REST client shape: a namespace scope, a resource kind,
/// a resource name, an optional sub-resource and query parameters.
#[derive(Debug, Clone)]
pub struct ResourceRequest<'a> {
    base: &'a str,
    namespace: String,
    resource: String,
    name: String,
    sub_resource: Option<String>,
    params: Vec<(&'static str, String)>,
    timeout: Option<Duration>,
}

impl<'a> ResourceRequest<'a> {
    pub(crate) fn new(base: &'a str) -> Self {
        Self {
            base,
            namespace: String::new(),
            resource: String::new(),
            name: String::new(),
            sub_resource: None,
            params: Vec::new(),
            timeout: None,
        }
    }

    /// Scope the request to a namespace. Empty means the cluster default.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn sub_resource(mut self, sub_resource: impl Into<String>) -> Self {
        self.sub_resource = Some(sub_resource.into());
        self
    }

    pub fn versioned_params(mut self, params: &impl QueryParams) -> Self {
        params.append_to(&mut self.params);
        self
    }

    /// Server-side timeout, sent as the `timeout` query parameter.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Render the full request URL.
    pub fn url(&self) -> Result<String> {
        if self.resource.is_empty() {
            return Err(ClusterError::InvalidLocator(
                "resource must be specified".to_string(),
            ));
        }
        if self.name.is_empty() && self.sub_resource.is_some() {
            return Err(ClusterError::InvalidLocator(
                "sub-resource requires a resource name".to_string(),
            ));
        }

        let mut path = String::from(API_PREFIX);
        if !self.namespace.is_empty() {
            push_segment(&mut path, "namespaces")?;
            push_segment(&mut path, &self.namespace)?;
        }
        push_segment(&mut path, &self.resource)?;
        if !self.name.is_empty() {
            push_segment(&mut path, &self.name)?;
        }
        if let Some(sub) = &self.sub_resource {
            push_segment(&mut path, sub)?;
        }

        let mut query: Vec<String> = self
            .params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect();
        if let Some(timeout) = self.timeout {
            query.push(format!("timeout={}", format_timeout(timeout)));
        }

        let mut url = format!("{}{}", self.base.trim_end_matches('/'), path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        Ok(url)
    }
}

fn push_segment(path: &mut String, segment: &str) -> Result<()> {
    if segment.is_empty() || segment.contains('/') || segment == "." || segment == ".." {
        return Err(ClusterError::InvalidLocator(format!(
            "invalid path segment {:?}",
            segment
        )));
    }
    path.push('/');
    path.push_str(&urlencoding::encode(segment));
    Ok(())
}

/// Format a duration the way the API server parses it (`60s`, `1500ms`).
///
/// Fractional milliseconds round up; `0ms` would disable the server-side timeout.
fn format_timeout(timeout: Duration) -> String {
    if timeout.subsec_nanos() == 0 {
        format!("{}s", timeout.as_secs())
    } else {
        format!("{}ms", timeout.as_nanos().div_ceil(1_000_000))
    }
}
