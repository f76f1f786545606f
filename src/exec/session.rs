// ABOUTME: Builds the exec session for a validated request.
// ABOUTME: Resource locator, stream flags, deadline, and the WebSocket connect.

use super::error::StreamError;
use super::protocol::EXEC_PROTOCOL;
use super::request::PreparedRequest;
use crate::cluster::{ClusterConnection, ClusterError, QueryParams};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async_tls_with_config};

pub(crate) type ExecStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Versioned query parameters of the pod `exec` sub-resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    pub container: String,
    pub command: Vec<String>,
    pub stdin: bool,
    pub stdout: bool,
    pub stderr: bool,
    pub tty: bool,
}

impl ExecOptions {
    /// Non-interactive capture: stdout and stderr only, no stdin, no TTY.
    pub fn capture(container: &str, command: &[String]) -> Self {
        Self {
            container: container.to_string(),
            command: command.to_vec(),
            stdin: false,
            stdout: true,
            stderr: true,
            tty: false,
        }
    }
}

impl QueryParams for ExecOptions {
    fn append_to(&self, query: &mut Vec<(&'static str, String)>) {
        if !self.container.is_empty() {
            query.push(("container", self.container.clone()));
        }
        for arg in &self.command {
            query.push(("command", arg.clone()));
        }
        query.push(("stdin", self.stdin.to_string()));
        query.push(("stdout", self.stdout.to_string()));
        query.push(("stderr", self.stderr.to_string()));
        query.push(("tty", self.tty.to_string()));
    }
}

/// A ready-to-open exec stream against one pod container.
pub(crate) struct ExecSession<'c> {
    connection: &'c ClusterConnection,
    request: Request,
    deadline: Duration,
}

impl<'c> ExecSession<'c> {
    pub(crate) fn build(
        connection: &'c ClusterConnection,
        prepared: &PreparedRequest,
    ) -> Result<Self, ClusterError> {
        let target = &prepared.target;
        let options = ExecOptions::capture(&target.container, &target.command);

        let url = connection
            .request()
            .namespace(target.namespace.as_str())
            .resource("pods")
            .name(target.pod.as_str())
            .sub_resource("exec")
            .versioned_params(&options)
            .timeout(prepared.timeout)
            .url()?;

        let request = connection.upgrade_request(&url, EXEC_PROTOCOL)?;

        Ok(Self {
            connection,
            request,
            deadline: prepared.timeout,
        })
    }

    pub(crate) fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Open the upgraded stream. Auth and routing failures surface here.
    pub(crate) async fn connect(self) -> Result<ExecStream, StreamError> {
        tracing::debug!(uri = %self.request.uri(), "opening exec stream");

        let (stream, response) = connect_async_tls_with_config(
            self.request,
            None,
            true,
            self.connection.connector(),
        )
        .await
        .map_err(StreamError::Connect)?;

        tracing::debug!(status = %response.status(), "exec stream upgraded");
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ExecRequest;

    #[test]
    fn capture_options_serialize_in_wire_order() {
        let options = ExecOptions::capture("nginx", &["ls".to_string(), "-a".to_string()]);
        let mut query = Vec::new();
        options.append_to(&mut query);

        let rendered: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        assert_eq!(
            rendered,
            vec![
                "container=nginx",
                "command=ls",
                "command=-a",
                "stdin=false",
                "stdout=true",
                "stderr=true",
                "tty=false",
            ]
        );
    }

    #[test]
    fn empty_container_is_left_to_the_server() {
        let options = ExecOptions::capture("", &["true".to_string()]);
        let mut query = Vec::new();
        options.append_to(&mut query);
        assert!(query.iter().all(|(k, _)| *k != "container"));
    }

    #[test]
    fn session_targets_pod_exec_with_deadline() {
        let connection = ClusterConnection::new("https://cluster:6443").unwrap();
        let prepared = ExecRequest::new("nginx", ["ls", "-a"])
            .namespace("executor")
            .container("nginx")
            .prepare()
            .unwrap();

        let session = ExecSession::build(&connection, &prepared).unwrap();

        assert_eq!(session.deadline(), Duration::from_secs(60));
        assert_eq!(
            session.request.uri().to_string(),
            "wss://cluster:6443/api/v1/namespaces/executor/pods/nginx/exec?container=nginx&command=ls&command=-a&stdin=false&stdout=true&stderr=true&tty=false&timeout=60s"
        );
    }

    #[test]
    fn malformed_pod_name_fails_setup() {
        let connection = ClusterConnection::new("https://cluster:6443").unwrap();
        let prepared = ExecRequest::new("../etc", ["ls"]).prepare().unwrap();

        assert!(ExecSession::build(&connection, &prepared).is_err());
    }
}
