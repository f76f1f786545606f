// ABOUTME: In-process fake of the pod exec endpoint for integration tests.
// ABOUTME: Speaks v4.channel.k8s.io over WebSocket and replays a scripted session.

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use podexec::cluster::ClusterConnection;
use podexec::exec::CommandExecutor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::tungstenite::http::header::{AUTHORIZATION, SEC_WEBSOCKET_PROTOCOL};

pub const TEST_TOKEN: &str = "test-token";

/// One scripted action of the fake remote command.
#[derive(Debug, Clone)]
pub enum Step {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    /// Report the exit code on the error channel and close.
    Exit(i32),
    /// Report a non-exit failure status with this message.
    Fail(String),
    Sleep(Duration),
    /// Never finish; wait until the client goes away.
    Hang,
}

impl Step {
    pub fn stdout(text: &str) -> Self {
        Step::Stdout(text.as_bytes().to_vec())
    }

    pub fn stderr(text: &str) -> Self {
        Step::Stderr(text.as_bytes().to_vec())
    }
}

/// What the fake server saw in the upgrade request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub protocol: Option<String>,
}

impl RecordedRequest {
    fn from_request(req: &Request) -> Self {
        let query = req
            .uri()
            .query()
            .unwrap_or("")
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (
                    key.to_string(),
                    urlencoding::decode(value).unwrap().into_owned(),
                )
            })
            .collect();

        Self {
            path: req.uri().path().to_string(),
            query,
            authorization: header(req, AUTHORIZATION),
            protocol: header(req, SEC_WEBSOCKET_PROTOCOL),
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn command(&self) -> Vec<String> {
        self.query
            .iter()
            .filter(|(k, _)| k == "command")
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Pod name from `/api/v1/[namespaces/{ns}/]pods/{pod}/exec`.
    pub fn pod(&self) -> String {
        let segments: Vec<&str> = self.path.split('/').collect();
        let idx = segments.iter().position(|s| *s == "pods").unwrap();
        segments[idx + 1].to_string()
    }
}

fn header(req: &Request, name: http::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

type Script = dyn Fn(&RecordedRequest) -> Vec<Step> + Send + Sync;

/// Fake API server accepting exec upgrades on a local port.
pub struct FakeCluster {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    disconnected: Arc<Notify>,
}

impl FakeCluster {
    /// Serve every exec with the steps produced by `script`.
    pub async fn start<F>(script: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Vec<Step> + Send + Sync + 'static,
    {
        Self::serve(Arc::new(script), None).await
    }

    /// Refuse every upgrade with the given HTTP status.
    pub async fn rejecting(status: u16) -> Self {
        Self::serve(Arc::new(|_: &RecordedRequest| Vec::new()), Some(status)).await
    }

    async fn serve(script: Arc<Script>, reject: Option<u16>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let disconnected = Arc::new(Notify::new());

        let accept_requests = Arc::clone(&requests);
        let accept_disconnected = Arc::clone(&disconnected);
        tokio::spawn(async move {
            while let Ok((tcp, _)) = listener.accept().await {
                tokio::spawn(handle(
                    tcp,
                    Arc::clone(&script),
                    reject,
                    Arc::clone(&accept_requests),
                    Arc::clone(&accept_disconnected),
                ));
            }
        });

        Self {
            addr,
            requests,
            disconnected,
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn connection(&self) -> ClusterConnection {
        ClusterConnection::new(self.server_url())
            .unwrap()
            .bearer_token(TEST_TOKEN)
    }

    pub fn executor(&self) -> CommandExecutor {
        CommandExecutor::new(self.connection())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Resolves once a hanging session sees its client go away.
    pub async fn wait_disconnected(&self) {
        self.disconnected.notified().await;
    }
}

async fn handle(
    tcp: TcpStream,
    script: Arc<Script>,
    reject: Option<u16>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    disconnected: Arc<Notify>,
) {
    let mut recorded = None;
    let callback = |req: &Request, mut resp: Response| -> Result<Response, ErrorResponse> {
        let rec = RecordedRequest::from_request(req);
        requests.lock().push(rec.clone());

        if let Some(status) = reject {
            return Err(http::Response::builder()
                .status(status)
                .body(Some("forbidden".to_string()))
                .unwrap());
        }

        if let Some(protocol) = req.headers().get(SEC_WEBSOCKET_PROTOCOL) {
            resp.headers_mut()
                .insert(SEC_WEBSOCKET_PROTOCOL, protocol.clone());
        }
        recorded = Some(rec);
        Ok(resp)
    };

    let Ok(mut ws) = tokio_tungstenite::accept_hdr_async(tcp, callback).await else {
        return;
    };
    let Some(recorded) = recorded else {
        return;
    };

    // Announce the output channels the way the API server does.
    for channel in [1u8, 2, 3] {
        if ws.send(Message::Binary(vec![channel])).await.is_err() {
            return;
        }
    }

    for step in script(&recorded) {
        let message = match step {
            Step::Stdout(data) => framed(1, &data),
            Step::Stderr(data) => framed(2, &data),
            Step::Exit(0) => framed(3, br#"{"metadata":{},"status":"Success"}"#),
            Step::Exit(code) => framed(3, exit_status(code).as_bytes()),
            Step::Fail(message) => framed(3, failure_status(&message).as_bytes()),
            Step::Sleep(duration) => {
                tokio::time::sleep(duration).await;
                continue;
            }
            Step::Hang => {
                while let Some(Ok(_)) = ws.next().await {}
                disconnected.notify_one();
                return;
            }
        };
        if ws.send(message).await.is_err() {
            disconnected.notify_one();
            return;
        }
    }

    let _ = ws.close(None).await;
    while let Some(Ok(_)) = ws.next().await {}
}

fn framed(channel: u8, payload: &[u8]) -> Message {
    let mut data = Vec::with_capacity(payload.len() + 1);
    data.push(channel);
    data.extend_from_slice(payload);
    Message::Binary(data)
}

fn exit_status(code: i32) -> String {
    serde_json::json!({
        "metadata": {},
        "status": "Failure",
        "message": format!("command terminated with non-zero exit code: exit status {code}"),
        "reason": "NonZeroExitCode",
        "details": {
            "causes": [{ "reason": "ExitCode", "message": code.to_string() }]
        }
    })
    .to_string()
}

fn failure_status(message: &str) -> String {
    serde_json::json!({
        "metadata": {},
        "status": "Failure",
        "message": message,
    })
    .to_string()
}
