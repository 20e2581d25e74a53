//! Price feed structures shared by the ledger, the daemon, and tests.

use serde::{Deserialize, Serialize};

use crate::RoundId;

/// A single accepted price observation. Immutable once stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Round id assigned by the ledger. Dense, starts at 1.
    pub round_id: RoundId,
    /// Price in the feed's fixed-point unit.
    pub price: i64,
    /// Unix timestamp at which the observation was accepted.
    pub timestamp: u64,
    /// Reserved for future soft-invalidation; always `true` under
    /// current admission logic.
    pub valid: bool,
}

/// Validation parameters governing observation admission and staleness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Inclusive lower price bound.
    pub min_answer: i64,
    /// Inclusive upper price bound. Must be strictly greater than
    /// `min_answer`.
    pub max_answer: i64,
    /// Minimum seconds between two accepted observations. Must be positive.
    pub update_interval: u64,
    /// Maximum seconds the last observation may age before the feed is
    /// considered stale. Must be positive.
    pub heartbeat: u64,
    /// Minimum price delta intended to gate acceptance. Validated but not
    /// consulted by the admission path. Must be positive.
    pub deviation_threshold: u64,
}
