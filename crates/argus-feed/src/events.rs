//! Change notification bus.
//!
//! Successful mutations emit [`FeedEvent`]s synchronously, while the write
//! lock is still held, so subscribers observe events in exactly the order
//! of the successful calls that produced them. Emission never blocks and is
//! unaffected by absent or lagging subscribers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use argus_types::events::FeedEvent;
use tokio::sync::broadcast;

/// Broadcast bus for feed change notifications.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<FeedEvent>,
    sequence: Arc<AtomicU64>,
}

impl EventBus {
    /// Create a new bus with the given per-subscriber buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: FeedEvent) {
        self.sequence.fetch_add(1, Ordering::SeqCst);
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to events. Returns an independent receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.sender.subscribe()
    }

    /// Number of events emitted so far.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}
