// ABOUTME: Exec error types with SNAFU pattern.
// ABOUTME: Composes invocation context, the stream failure, and captured stderr into one error.

use super::output::OutputChannel;
use super::request::ExecTarget;
use crate::cluster::ClusterError;
use snafu::Snafu;
use std::time::Duration;
use tokio_tungstenite::tungstenite;

/// Failure of a single `execute` call.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExecError {
    #[snafu(display("invalid command execute request: {reason}"))]
    InvalidRequest { reason: &'static str },

    #[snafu(display("failed to prepare request executor: {source}"))]
    SessionSetup { source: ClusterError },

    #[snafu(display(
        "failed executing command {target}: {source}{}",
        stderr_suffix(stderr)
    ))]
    ExecutionFailed {
        target: ExecTarget,
        stderr: String,
        source: StreamError,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecErrorKind {
    /// The request was rejected before any network activity.
    InvalidRequest,
    /// The exec session could not be constructed.
    SessionSetupFailed,
    /// The session ran and ended in failure.
    ExecutionFailed,
}

/// Why a running session failed.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("failed to open exec stream: {0}")]
    Connect(#[source] tungstenite::Error),

    #[error("exec stream failed: {0}")]
    Transport(#[source] tungstenite::Error),

    #[error("exec protocol error: {0}")]
    Protocol(String),

    #[error("command terminated with exit code {code}")]
    NonZeroExit { code: i32 },

    #[error("error executing remote command: {message}")]
    RemoteFailure { message: String },

    #[error("command timed out after {0:?}")]
    TimedOut(Duration),

    #[error("command execution was cancelled")]
    Cancelled,

    #[error("failed writing {channel} to sink: {source}")]
    Sink {
        channel: OutputChannel,
        #[source]
        source: std::io::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(", stderr: {}", trimmed)
    }
}

impl ExecError {
    pub(crate) fn invalid_request(reason: &'static str) -> Self {
        ExecError::InvalidRequest { reason }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ExecErrorKind {
        match self {
            ExecError::InvalidRequest { .. } => ExecErrorKind::InvalidRequest,
            ExecError::SessionSetup { .. } => ExecErrorKind::SessionSetupFailed,
            ExecError::ExecutionFailed { .. } => ExecErrorKind::ExecutionFailed,
        }
    }

    /// The stream failure behind an execution error.
    pub fn cause(&self) -> Option<&StreamError> {
        match self {
            ExecError::ExecutionFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Remote exit code, if the command ran and exited non-zero.
    pub fn exit_code(&self) -> Option<i32> {
        match self.cause() {
            Some(StreamError::NonZeroExit { code }) => Some(*code),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.cause(), Some(StreamError::TimedOut(_)))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause(), Some(StreamError::Cancelled))
    }

    /// Standard error captured before the failure, if any.
    ///
    /// Whitespace-only output counts as none, matching the message suffix.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ExecError::ExecutionFailed { stderr, .. } if !stderr.trim().is_empty() => {
                Some(stderr)
            }
            _ => None,
        }
    }
}
