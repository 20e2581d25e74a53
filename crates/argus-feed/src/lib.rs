//! # argus-feed
//!
//! Round-indexed price ledger for a single commodity feed.
//!
//! The feed records periodic price observations, enforcing admission rules
//! on each one (writer authorization, suspension, numeric bounds, minimum
//! time spacing), tracks staleness against a heartbeat deadline, and serves
//! point and range queries over the recorded history. A higher-level
//! aggregator cross-checks several such feeds; this crate covers exactly
//! one.
//!
//! ## Modules
//!
//! - [`ledger`] — append-only, round-indexed observation store
//! - [`config`] — validation rules for the feed parameters
//! - [`staleness`] — heartbeat staleness checks
//! - [`reference`] — external reference feed adapter
//! - [`events`] — change notification bus
//! - [`service`] — the locked service surface tying it all together

pub mod config;
pub mod events;
pub mod ledger;
pub mod reference;
pub mod service;
pub mod staleness;

use argus_types::RoundId;

/// Error types for feed operations.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Caller is not the designated writer.
    #[error("caller is not the authorized writer")]
    Unauthorized,

    /// The feed is suspended by the administrative authority.
    #[error("feed is suspended")]
    Suspended,

    /// Price outside the configured bounds.
    #[error("price {price} outside bounds [{min}, {max}]")]
    OutOfBounds {
        /// The rejected price.
        price: i64,
        /// Configured inclusive lower bound.
        min: i64,
        /// Configured inclusive upper bound.
        max: i64,
    },

    /// Minimum update spacing has not elapsed.
    #[error("update too soon: earliest accepted time is {earliest}, got {now}")]
    TooSoon {
        /// The rejected submission time.
        now: u64,
        /// First timestamp at which a submission would be accepted.
        earliest: u64,
    },

    /// Proposed configuration failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// No observation has ever been accepted.
    #[error("no observations recorded")]
    NotFound,

    /// Round id outside the recorded round space.
    #[error("invalid round id: {0}")]
    InvalidRound(RoundId),

    /// Round range outside the recorded round space.
    #[error("invalid round range: {start}..={end}")]
    InvalidRange {
        /// Requested first round.
        start: RoundId,
        /// Requested last round.
        end: RoundId,
    },

    /// Reference feed output is older than the heartbeat allows.
    #[error(
        "reference price is stale: observed at {observed_at}, current {now}, heartbeat {heartbeat}"
    )]
    StaleReference {
        /// Timestamp reported by the reference feed.
        observed_at: u64,
        /// Current timestamp.
        now: u64,
        /// Heartbeat window in seconds.
        heartbeat: u64,
    },

    /// Reference feed returned a non-positive price.
    #[error("invalid reference price: {0}")]
    InvalidReference(i64),

    /// The feed has already been initialized.
    #[error("feed already initialized")]
    AlreadyInitialized,

    /// The feed has not been initialized yet.
    #[error("feed not initialized")]
    NotInitialized,
}

/// Convenience result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
