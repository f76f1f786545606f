// ABOUTME: Execution request model with default filling and validation.
// ABOUTME: Only a PreparedRequest can be turned into an exec session.

use super::error::ExecError;
use crate::config::DEFAULT_TIMEOUT;
use std::time::Duration;
use tokio::io::AsyncWrite;

/// Writable byte sink that receives a live copy of one output channel.
pub type OutputSink = Box<dyn AsyncWrite + Send + Unpin>;

/// What to run and where.
pub struct ExecRequest {
    /// Name of the pod to exec into. Required.
    pub pod: String,
    /// Namespace of the pod. Empty means the cluster default.
    pub namespace: String,
    /// Container within the pod. Empty lets the cluster pick its default container.
    pub container: String,
    /// Argv to run. Not interpreted by a shell.
    pub command: Vec<String>,
    /// Upper bound on wall time. Zero means the 60 second default.
    pub timeout: Duration,
    /// Optional live copy of standard output. The result keeps its own copy regardless.
    pub stdout: Option<OutputSink>,
    /// Optional live copy of standard error. The result keeps its own copy regardless.
    pub stderr: Option<OutputSink>,
}

impl std::fmt::Debug for ExecRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecRequest")
            .field("pod", &self.pod)
            .field("namespace", &self.namespace)
            .field("container", &self.container)
            .field("command", &self.command)
            .field("timeout", &self.timeout)
            .field("stdout", &self.stdout.as_ref().map(|_| "<sink>"))
            .field("stderr", &self.stderr.as_ref().map(|_| "<sink>"))
            .finish()
    }
}

impl ExecRequest {
    pub fn new<I, S>(pod: impl Into<String>, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pod: pod.into(),
            namespace: String::new(),
            container: String::new(),
            command: command.into_iter().map(Into::into).collect(),
            timeout: Duration::ZERO,
            stdout: None,
            stderr: None,
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn container(mut self, container: impl Into<String>) -> Self {
        self.container = container.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn stdout(mut self, sink: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        self.stdout = Some(Box::new(sink));
        self
    }

    pub fn stderr(mut self, sink: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        self.stderr = Some(Box::new(sink));
        self
    }

    /// Fill unset fields. Namespace and container stay empty on purpose.
    pub fn apply_defaults(&mut self) {
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
    }

    pub fn validate(&self) -> Result<(), ExecError> {
        if self.pod.is_empty() {
            return Err(ExecError::invalid_request("pod name must be specified"));
        }

        if self.command.is_empty() {
            return Err(ExecError::invalid_request(
                "command slice should not be empty",
            ));
        }

        Ok(())
    }

    /// Normalize then validate, once each.
    pub(crate) fn prepare(mut self) -> Result<PreparedRequest, ExecError> {
        self.apply_defaults();
        self.validate()?;

        let ExecRequest {
            pod,
            namespace,
            container,
            command,
            timeout,
            stdout,
            stderr,
        } = self;

        Ok(PreparedRequest {
            target: ExecTarget {
                pod,
                namespace,
                container,
                command,
            },
            timeout,
            stdout,
            stderr,
        })
    }
}

/// Where and what to run, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecTarget {
    pub pod: String,
    pub namespace: String,
    pub container: String,
    pub command: Vec<String>,
}

impl std::fmt::Display for ExecTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] on {}/{} in container {}",
            self.command.join(" "),
            self.namespace,
            self.pod,
            self.container
        )
    }
}

/// A defaulted, validated request. Sinks are split out so the driver can own them.
pub(crate) struct PreparedRequest {
    pub(crate) target: ExecTarget,
    pub(crate) timeout: Duration,
    pub(crate) stdout: Option<OutputSink>,
    pub(crate) stderr: Option<OutputSink>,
}
