//! Realtime change feed from the hosted store.
//!
//! The store pushes one server-sent event per table change:
//!
//! ```text
//! data: {"table":"students","type":"INSERT"}
//! ```
//!
//! The listener turns those into [`ChangeEvent`]s on a [`ChangeNotifier`].
//! Frames for unknown tables or change types are ignored. When the stream
//! fails or ends the listener logs it, closes the notifier and stops; there
//! is no reconnect. Collections then fall back to applying their own writes.

use std::sync::Arc;

use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::client::RemoteClient;
use crate::metrics::record_change_notification;
use crate::notify::{ChangeEvent, ChangeNotifier, ChangeOp};
use crate::record::RecordKind;

/// Payload of one change frame.
#[derive(Debug, Deserialize)]
struct ChangeFrame {
    table: String,
    #[serde(rename = "type", alias = "eventType")]
    change_type: String,
}

/// Stateful SSE parser that buffers incomplete frames across chunk boundaries.
///
/// Works on bytes so multi-byte characters split between chunks survive.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feeds a chunk and returns the change events of every complete frame.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ChangeEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(end) = self.find_frame_boundary() {
            let frame: Vec<u8> = self.buffer.drain(..end).collect();
            if let Some(event) = Self::parse_frame(&String::from_utf8_lossy(&frame)) {
                events.push(event);
            }
        }

        events
    }

    /// End of the first complete frame, including its blank-line terminator.
    fn find_frame_boundary(&self) -> Option<usize> {
        let lf = find(&self.buffer, b"\n\n").map(|pos| pos + 2);
        let crlf = find(&self.buffer, b"\r\n\r\n").map(|pos| pos + 4);
        match (lf, crlf) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn parse_frame(frame: &str) -> Option<ChangeEvent> {
        let data: Vec<&str> = frame
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(':'))
            .filter_map(|line| line.strip_prefix("data:"))
            .map(str::trim)
            .filter(|data| !data.is_empty())
            .collect();

        if data.is_empty() {
            return None;
        }

        let frame: ChangeFrame = match serde_json::from_str(&data.join("\n")) {
            Ok(frame) => frame,
            Err(e) => {
                debug!(error = %e, "Ignoring malformed change frame");
                return None;
            }
        };

        let kind = RecordKind::from_table(&frame.table)?;
        let op = frame.change_type.parse::<ChangeOp>().ok()?;
        Some(ChangeEvent { kind, op })
    }

    /// Bytes buffered but not yet terminated.
    pub fn remaining(&self) -> &[u8] {
        &self.buffer
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Background task forwarding the remote change stream to a notifier.
///
/// Stopped on [`RealtimeListener::shutdown`] or when dropped.
pub struct RealtimeListener {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RealtimeListener {
    pub fn spawn(client: Arc<RemoteClient>, notifier: ChangeNotifier) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(client, notifier, shutdown_rx));
        Self {
            shutdown_tx,
            handle,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RealtimeListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run(
    client: Arc<RemoteClient>,
    notifier: ChangeNotifier,
    shutdown_rx: watch::Receiver<bool>,
) {
    listen(&client, &notifier, shutdown_rx).await;
    notifier.close();
}

async fn listen(
    client: &RemoteClient,
    notifier: &ChangeNotifier,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let response = tokio::select! {
        response = client.open_change_stream() => response,
        _ = shutdown_rx.changed() => return,
    };

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Realtime change stream unavailable, collections refresh on demand only");
            return;
        }
    };

    info!(url = client.base_url(), "Realtime change stream connected");
    let mut stream = response.bytes_stream();
    let mut parser = SseParser::new();

    loop {
        tokio::select! {
            chunk = stream.next() => match chunk {
                Some(Ok(bytes)) => {
                    for event in parser.feed(&bytes) {
                        record_change_notification(event.kind);
                        let delivered = notifier.publish(event);
                        debug!(table = event.kind.table(), op = ?event.op, delivered, "Change notification");
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Realtime change stream failed");
                    break;
                }
                None => {
                    info!("Realtime change stream closed by server");
                    break;
                }
            },
            _ = shutdown_rx.changed() => {
                debug!("Realtime listener shutting down");
                break;
            }
        }
    }
}
