// ABOUTME: Command executor entry point.
// ABOUTME: Prepares the request, builds the session, drives it, and reports the outcome.

use super::driver;
use super::error::{ExecError, SessionSetupSnafu};
use super::ops::PodExecOps;
use super::output::{self, ChannelSink, ExecOutput, OutputChannel};
use super::request::{ExecRequest, PreparedRequest};
use super::sealed::Sealed;
use super::session::ExecSession;
use crate::cluster::ClusterConnection;
use async_trait::async_trait;
use snafu::ResultExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs commands in pod containers over a shared cluster connection.
///
/// Cheap to clone; every clone and every call shares the same connection
/// and opens an independent exec stream.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    connection: Arc<ClusterConnection>,
}

impl CommandExecutor {
    pub fn new(connection: ClusterConnection) -> Self {
        Self::from_shared(Arc::new(connection))
    }

    /// Reuse a connection that is already shared elsewhere.
    pub fn from_shared(connection: Arc<ClusterConnection>) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &ClusterConnection {
        &self.connection
    }
}

impl Sealed for CommandExecutor {}

#[async_trait]
impl PodExecOps for CommandExecutor {
    async fn execute(&self, request: ExecRequest) -> Result<ExecOutput, ExecError> {
        self.execute_with_cancel(request, &CancellationToken::new())
            .await
    }

    async fn execute_with_cancel(
        &self,
        request: ExecRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecOutput, ExecError> {
        let prepared = request.prepare()?;
        let session = ExecSession::build(&self.connection, &prepared).context(SessionSetupSnafu)?;

        let PreparedRequest {
            target,
            stdout,
            stderr,
            ..
        } = prepared;
        let mut stdout = ChannelSink::new(OutputChannel::Stdout, stdout);
        let mut stderr = ChannelSink::new(OutputChannel::Stderr, stderr);

        tracing::debug!(
            pod = %target.pod,
            namespace = %target.namespace,
            container = %target.container,
            command = ?target.command,
            "executing command"
        );

        match driver::run(session, &mut stdout, &mut stderr, cancel).await {
            Ok(()) => Ok(output::freeze(stdout, stderr)),
            Err(source) => Err(ExecError::ExecutionFailed {
                target,
                stderr: stderr.text(),
                source,
            }),
        }
    }
}
