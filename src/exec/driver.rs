// ABOUTME: Runs an exec session to a terminal outcome.
// ABOUTME: Drains stdout and stderr concurrently under a deadline and a cancellation token.

use super::error::StreamError;
use super::output::ChannelSink;
use super::protocol::{self, Frame};
use super::session::ExecSession;
use futures::{Stream, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;

/// Chunks buffered per channel between the socket reader and its sink.
const CHUNK_QUEUE_DEPTH: usize = 32;

/// Connect and drain the session into the two channel sinks.
pub(crate) async fn run(
    session: ExecSession<'_>,
    stdout: &mut ChannelSink,
    stderr: &mut ChannelSink,
    cancel: &CancellationToken,
) -> Result<(), StreamError> {
    let deadline = session.deadline();
    let attempt = async {
        let stream = session.connect().await?;
        pump(stream, stdout, stderr).await
    };
    supervise(attempt, deadline, cancel).await
}

/// Race an attempt against its deadline and the caller's cancellation.
///
/// Whichever fires first drops the attempt, closing its socket and
/// stopping both drains before this returns.
pub(crate) async fn supervise<F>(
    attempt: F,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<(), StreamError>
where
    F: Future<Output = Result<(), StreamError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StreamError::Cancelled),
        outcome = tokio::time::timeout(deadline, attempt) => match outcome {
            Ok(result) => result,
            Err(_) => Err(StreamError::TimedOut(deadline)),
        },
    }
}

/// Demultiplex frames into the two sinks and classify the exit status.
pub(crate) async fn pump<S>(
    frames: S,
    stdout: &mut ChannelSink,
    stderr: &mut ChannelSink,
) -> Result<(), StreamError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let (out_tx, out_rx) = mpsc::channel(CHUNK_QUEUE_DEPTH);
    let (err_tx, err_rx) = mpsc::channel(CHUNK_QUEUE_DEPTH);

    let (status, out, err) = tokio::join!(
        demux(frames, out_tx, err_tx),
        drain(out_rx, stdout),
        drain(err_rx, stderr),
    );

    let status = status?;
    out?;
    err?;
    protocol::exit_outcome(&status)
}

async fn demux<S>(
    mut frames: S,
    stdout: mpsc::Sender<Vec<u8>>,
    stderr: mpsc::Sender<Vec<u8>>,
) -> Result<Vec<u8>, StreamError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let mut status = Vec::new();
    let mut frame_count = 0usize;

    loop {
        // A closed queue means its sink failed; stop reading so the drain's
        // error surfaces now rather than at the deadline.
        let message = tokio::select! {
            biased;
            _ = stdout.closed() => break,
            _ = stderr.closed() => break,
            message = frames.next() => match message {
                Some(message) => message,
                None => break,
            },
        };
        let message = match message {
            Ok(message) => message,
            // The exit status is the last thing the server sends.
            Err(e) if !status.is_empty() => {
                tracing::warn!(error = %e, "exec stream closed uncleanly after exit status");
                break;
            }
            Err(e) => return Err(StreamError::Transport(e)),
        };

        let Some(frame) = protocol::decode(message)? else {
            continue;
        };
        frame_count += 1;

        let delivered = match frame {
            Frame::Stdout(chunk) => stdout.send(chunk).await.is_ok(),
            Frame::Stderr(chunk) => stderr.send(chunk).await.is_ok(),
            Frame::Status(bytes) => {
                status.extend_from_slice(&bytes);
                true
            }
        };
        if !delivered {
            break;
        }
    }

    tracing::debug!(frames = frame_count, "exec stream drained");
    Ok(status)
}

async fn drain(
    mut chunks: mpsc::Receiver<Vec<u8>>,
    sink: &mut ChannelSink,
) -> Result<(), StreamError> {
    while let Some(chunk) = chunks.recv().await {
        sink.write(&chunk).await?;
    }
    sink.finish().await
}
