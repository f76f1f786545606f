// ABOUTME: Test support utilities.
// ABOUTME: Provides the fake exec server, shared output sinks, and tracing setup.

use parking_lot::Mutex;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Once};
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

// Each test binary only uses some of these helpers, so allow dead_code.
#[allow(dead_code)]
pub mod exec_server;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("podexec=debug".parse().unwrap())
            .add_directive("tokio_tungstenite=info".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Writer whose contents stay readable after it is moved into a request.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

#[allow(dead_code)]
impl SharedBuffer {
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().clone()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl AsyncWrite for SharedBuffer {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.0.lock().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Split text into trimmed, space-free, non-empty lines, sorted.
#[allow(dead_code)]
pub fn output_to_sorted_lines(out: &str) -> Vec<String> {
    let mut lines: Vec<String> = out
        .split('\n')
        .map(|line| line.trim().replace(' ', ""))
        .filter(|line| !line.is_empty())
        .collect();
    lines.sort();
    lines
}
