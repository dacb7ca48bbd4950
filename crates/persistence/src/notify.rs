//! Change notification plumbing.
//!
//! A [`ChangeNotifier`] fans backend change events out to per-kind
//! [`ChangeSubscription`]s. Events carry no payload: consumers resynchronize
//! the whole collection on every signal. Once the notifier is closed every
//! subscription ends, even while stores still hold clones of it.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::record::RecordKind;

const CHANNEL_CAPACITY: usize = 64;

/// Operation reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

impl std::str::FromStr for ChangeOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INSERT" => Ok(ChangeOp::Insert),
            "UPDATE" => Ok(ChangeOp::Update),
            "DELETE" => Ok(ChangeOp::Delete),
            other => Err(format!("Unknown change type: {}", other)),
        }
    }
}

/// A change to one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: RecordKind,
    pub op: ChangeOp,
}

/// What a subscriber observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSignal {
    Changed(ChangeOp),
    /// The subscriber fell behind and missed this many events.
    Lagged(u64),
}

/// Publishing side of the change channel.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<ChangeEvent>,
    closed: Arc<watch::Sender<bool>>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (closed, _) = watch::channel(false);
        Self {
            tx,
            closed: Arc::new(closed),
        }
    }

    /// Publishes an event; returns the number of subscribers that received it.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        if self.is_closed() {
            return 0;
        }
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribes to events of a single kind.
    pub fn subscribe(&self, kind: RecordKind) -> ChangeSubscription {
        ChangeSubscription {
            kind,
            rx: self.tx.subscribe(),
            closed: self.closed.subscribe(),
        }
    }

    /// Ends every subscription, current and future. Publishing after close is a no-op.
    pub fn close(&self) {
        if !self.closed.send_replace(true) {
            debug!("Change notifier closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Receiving side for one record kind. Dropping it releases the subscription.
#[derive(Debug)]
pub struct ChangeSubscription {
    kind: RecordKind,
    rx: broadcast::Receiver<ChangeEvent>,
    closed: watch::Receiver<bool>,
}

impl ChangeSubscription {
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Waits for the next signal for this kind. `None` once the notifier is
    /// closed or gone.
    pub async fn next(&mut self) -> Option<ChangeSignal> {
        loop {
            if *self.closed.borrow_and_update() {
                return None;
            }
            tokio::select! {
                received = self.rx.recv() => match received {
                    Ok(event) if event.kind == self.kind => {
                        return Some(ChangeSignal::Changed(event.op))
                    }
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        debug!(kind = %self.kind, missed, "Change subscription lagged");
                        return Some(ChangeSignal::Lagged(missed));
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                },
                changed = self.closed.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                }
            }
        }
    }
}
