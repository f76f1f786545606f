// ABOUTME: Channel framing of the v4.channel.k8s.io exec protocol.
// ABOUTME: Splits frames by channel and decodes the final exit status document.

use super::error::StreamError;
use serde::Deserialize;
use tokio_tungstenite::tungstenite::Message;

/// WebSocket subprotocol requested for exec streams.
pub(crate) const EXEC_PROTOCOL: &str = "v4.channel.k8s.io";

const STDIN_CHANNEL: u8 = 0;
const STDOUT_CHANNEL: u8 = 1;
const STDERR_CHANNEL: u8 = 2;
const ERROR_CHANNEL: u8 = 3;

/// Payload of one data frame, tagged by channel.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Frame {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    Status(Vec<u8>),
}

/// Decode one WebSocket message. Control and empty frames yield `None`.
pub(crate) fn decode(message: Message) -> Result<Option<Frame>, StreamError> {
    let mut data = match message {
        Message::Binary(data) => data,
        Message::Text(_) => {
            return Err(StreamError::Protocol(
                "unexpected text frame on binary channel protocol".to_string(),
            ));
        }
        _ => return Ok(None),
    };

    if data.is_empty() {
        return Ok(None);
    }
    let payload = data.split_off(1);
    let channel = data[0];

    // The server announces each channel with a bare channel byte.
    if payload.is_empty() {
        return Ok(None);
    }

    match channel {
        STDOUT_CHANNEL => Ok(Some(Frame::Stdout(payload))),
        STDERR_CHANNEL => Ok(Some(Frame::Stderr(payload))),
        ERROR_CHANNEL => Ok(Some(Frame::Status(payload))),
        STDIN_CHANNEL => Err(StreamError::Protocol(
            "server wrote to the stdin channel".to_string(),
        )),
        other => Err(StreamError::Protocol(format!("unknown channel {}", other))),
    }
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    details: Option<StatusDetails>,
}

#[derive(Debug, Deserialize)]
struct StatusDetails {
    #[serde(default)]
    causes: Vec<StatusCause>,
}

#[derive(Debug, Deserialize)]
struct StatusCause {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    message: String,
}

/// Classify the bytes collected from the error channel.
///
/// An empty channel means the command exited cleanly.
pub(crate) fn exit_outcome(raw: &[u8]) -> Result<(), StreamError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }

    let status: Status = serde_json::from_slice(raw)
        .map_err(|e| StreamError::Protocol(format!("malformed exit status: {}", e)))?;

    if status.status == "Success" {
        return Ok(());
    }

    if status.reason == "NonZeroExitCode" {
        let code = status
            .details
            .iter()
            .flat_map(|details| details.causes.iter())
            .find(|cause| cause.reason == "ExitCode")
            .and_then(|cause| cause.message.trim().parse::<i32>().ok());

        return match code {
            Some(code) => Err(StreamError::NonZeroExit { code }),
            None => Err(StreamError::Protocol(format!(
                "non-zero exit without exit code: {}",
                status.message
            ))),
        };
    }

    Err(StreamError::RemoteFailure {
        message: status.message,
    })
}
