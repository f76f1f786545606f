// ABOUTME: Captured stdout/stderr of a finished exec and the sinks that fill it.
// ABOUTME: Each channel sink writes to an internal buffer and an optional mirror together.

use super::error::StreamError;
use super::request::OutputSink;
use tokio::io::AsyncWriteExt;

/// One of the two output channels of a remote command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChannel {
    Stdout,
    Stderr,
}

impl std::fmt::Display for OutputChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputChannel::Stdout => write!(f, "stdout"),
            OutputChannel::Stderr => write!(f, "stderr"),
        }
    }
}

/// Output of a command that finished successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl ExecOutput {
    /// Standard output as text.
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Standard error as text.
    pub fn err_output(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    pub fn stdout_bytes(&self) -> &[u8] {
        &self.stdout
    }

    pub fn stderr_bytes(&self) -> &[u8] {
        &self.stderr
    }
}

/// Destination for one channel: buffer plus optional mirror, fused.
///
/// A chunk is appended to the buffer and then written in full to the mirror
/// before the next chunk is accepted. A mirror failure fails the write.
pub(crate) struct ChannelSink {
    channel: OutputChannel,
    buffer: Vec<u8>,
    mirror: Option<OutputSink>,
}

impl ChannelSink {
    pub(crate) fn new(channel: OutputChannel, mirror: Option<OutputSink>) -> Self {
        Self {
            channel,
            buffer: Vec::new(),
            mirror,
        }
    }

    pub(crate) async fn write(&mut self, chunk: &[u8]) -> Result<(), StreamError> {
        self.buffer.extend_from_slice(chunk);
        if let Some(mirror) = self.mirror.as_mut() {
            mirror
                .write_all(chunk)
                .await
                .map_err(|source| StreamError::Sink {
                    channel: self.channel,
                    source,
                })?;
        }
        Ok(())
    }

    /// Flush the mirror once the channel is closed.
    pub(crate) async fn finish(&mut self) -> Result<(), StreamError> {
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.flush().await.map_err(|source| StreamError::Sink {
                channel: self.channel,
                source,
            })?;
        }
        Ok(())
    }

    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    pub(crate) fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }
}

/// Freeze both channel buffers into the result handed to the caller.
pub(crate) fn freeze(stdout: ChannelSink, stderr: ChannelSink) -> ExecOutput {
    ExecOutput {
        stdout: stdout.into_buffer(),
        stderr: stderr.into_buffer(),
    }
}
