//! Live update fan-out.
//!
//! Every subscriber owns a bounded queue. [`Broadcaster::notify`] only ever
//! `try_send`s into those queues, so a slow or dead subscriber can neither
//! block the ingest path nor delay delivery to anyone else. Writing the
//! notification to the actual connection is the subscriber task's job.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::debug;

use crate::error::TransportError;

/// Default queue depth per subscriber.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 8;

/// Opaque handle identifying one subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// "Something changed, re-query" hint. Carries the server that triggered it
/// for logging; clients must not rely on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub server_id: String,
}

impl Update {
    pub fn new(server_id: impl Into<String>) -> Self {
        Self {
            server_id: server_id.into(),
        }
    }
}

/// Receiving side handed to a subscriber.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<Update>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next update. `None` once the subscriber has been removed
    /// and its queue drained.
    pub async fn recv(&mut self) -> Option<Update> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<Update, TryRecvError> {
        self.receiver.try_recv()
    }
}

/// Outcome of one [`Broadcaster::notify`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NotifyReport {
    /// Queued for delivery
    pub delivered: usize,
    /// Queue was full; the subscriber already has a pending hint
    pub dropped: usize,
    /// Subscriber was gone and has been deregistered
    pub removed: usize,
}

enum Delivery {
    Queued,
    Coalesced,
}

struct Inner {
    subscribers: scc::HashMap<SubscriberId, mpsc::Sender<Update>>,
    next_id: AtomicU64,
    buffer: usize,
}

/// Set of connected subscribers.
#[derive(Clone)]
pub struct Broadcaster {
    inner: Arc<Inner>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_SUBSCRIBER_BUFFER)
    }

    /// Broadcaster whose subscriber queues hold up to `buffer` updates.
    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                subscribers: scc::HashMap::new(),
                next_id: AtomicU64::new(1),
                buffer: buffer.max(1),
            }),
        }
    }

    pub async fn subscribe(&self) -> Subscription {
        let id = SubscriberId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel(self.inner.buffer);
        // ids are never reused, so the slot is always vacant
        let _ = self.inner.subscribers.insert_async(id, sender).await;
        debug!(subscriber = %id, "subscriber registered");
        Subscription { id, receiver }
    }

    /// Remove a subscriber. Unknown or already removed ids are ignored.
    pub async fn unsubscribe(&self, id: SubscriberId) {
        if self.inner.subscribers.remove_async(&id).await.is_some() {
            debug!(subscriber = %id, "subscriber removed");
        }
    }

    /// Offer `update` to every subscriber without waiting on any of them.
    /// Subscribers whose queue is closed are deregistered on the spot.
    pub async fn notify(&self, update: Update) -> NotifyReport {
        let mut report = NotifyReport::default();
        self.inner
            .subscribers
            .retain_async(|id, sender| match deliver(sender, &update) {
                Ok(Delivery::Queued) => {
                    report.delivered += 1;
                    true
                }
                Ok(Delivery::Coalesced) => {
                    report.dropped += 1;
                    true
                }
                Err(err) => {
                    debug!(subscriber = %id, error = %err, "dropping subscriber");
                    report.removed += 1;
                    false
                }
            })
            .await;

        debug!(
            server_id = %update.server_id,
            delivered = report.delivered,
            dropped = report.dropped,
            removed = report.removed,
            "update broadcast"
        );
        report
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver(sender: &mpsc::Sender<Update>, update: &Update) -> Result<Delivery, TransportError> {
    match sender.try_send(update.clone()) {
        Ok(()) => Ok(Delivery::Queued),
        Err(TrySendError::Full(_)) => Ok(Delivery::Coalesced),
        Err(TrySendError::Closed(_)) => Err(TransportError::Closed),
    }
}
