//! Change notification types emitted by the feed.
//!
//! Both notifications are emitted synchronously on success, in the order
//! of the successful calls that produced them.

use serde::{Deserialize, Serialize};

use crate::RoundId;

/// A notification emitted after a successful feed mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FeedEvent {
    /// A new observation was accepted into the ledger.
    PriceUpdated {
        round_id: RoundId,
        price: i64,
        timestamp: u64,
        category: String,
    },
    /// The validation parameters were replaced.
    ConfigUpdated {
        update_interval: u64,
        deviation_threshold: u64,
        heartbeat: u64,
        timestamp: u64,
    },
}
