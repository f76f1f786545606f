// ABOUTME: Exec operations trait for pod containers.
// ABOUTME: Run a command in a container and capture its output.

use super::error::ExecError;
use super::output::ExecOutput;
use super::request::ExecRequest;
use super::sealed::Sealed;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Exec operations: run commands in pod containers.
#[async_trait]
pub trait PodExecOps: Sealed + Send + Sync {
    /// Run the request to completion, bounded only by its timeout.
    async fn execute(&self, request: ExecRequest) -> Result<ExecOutput, ExecError>;

    /// Run the request, aborting early when `cancel` fires.
    async fn execute_with_cancel(
        &self,
        request: ExecRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecOutput, ExecError>;
}
