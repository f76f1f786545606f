// ABOUTME: Remote command execution inside pod containers.
// ABOUTME: Request model, output capture, session building, stream driving, error reporting.

mod driver;
mod error;
mod executor;
mod ops;
mod output;
mod protocol;
mod request;
pub(crate) mod sealed;
mod session;

pub use error::{ExecError, ExecErrorKind, StreamError};
pub use executor::CommandExecutor;
pub use ops::PodExecOps;
pub use output::{ExecOutput, OutputChannel};
pub use request::{ExecRequest, ExecTarget, OutputSink};
pub use session::ExecOptions;
pub use tokio_util::sync::CancellationToken;
