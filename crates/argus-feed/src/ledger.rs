//! Append-only, round-indexed price ledger.
//!
//! The ledger is the system of record for one commodity feed. Rounds are
//! numbered densely from 1 and round `k` lives at vector index `k - 1`;
//! entries are never removed or mutated once stored. The current round id
//! is always the count of accepted observations plus one.
//!
//! Admission here covers the config-driven checks (bounds, then minimum
//! spacing); caller authorization and suspension are handled a layer above,
//! before the ledger is reached.

use argus_types::feed::{OracleConfig, PriceObservation};
use argus_types::{RoundId, GENESIS_ROUND_ID};

use crate::{FeedError, Result};

/// The append-only observation store for a single commodity.
#[derive(Clone, Debug)]
pub struct PriceLedger {
    /// Commodity identifier, fixed at construction.
    category: String,
    /// Timestamp of the most recently accepted observation, or the
    /// construction time while the ledger is empty.
    last_update_time: u64,
    /// Accepted observations; round `k` at index `k - 1`.
    history: Vec<PriceObservation>,
}

impl PriceLedger {
    /// Create an empty ledger for `category`.
    ///
    /// `created_at` seeds `last_update_time`, so the first observation is
    /// admitted no earlier than `created_at + update_interval`.
    pub fn new(category: String, created_at: u64) -> Self {
        Self {
            category,
            last_update_time: created_at,
            history: Vec::new(),
        }
    }

    /// Commodity identifier for this ledger.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Round id the next accepted observation will receive.
    ///
    /// Equals the count of accepted observations plus one; a fresh ledger
    /// reports [`GENESIS_ROUND_ID`].
    pub fn current_round_id(&self) -> RoundId {
        self.history.len() as RoundId + GENESIS_ROUND_ID
    }

    /// Timestamp of the most recently accepted observation.
    pub fn last_update_time(&self) -> u64 {
        self.last_update_time
    }

    /// Validate and store a new observation.
    ///
    /// Checks run fail-fast: bounds first, then minimum spacing. A rejected
    /// call leaves the ledger unchanged.
    ///
    /// # Errors
    ///
    /// - [`FeedError::OutOfBounds`] if `price` violates the configured bounds
    /// - [`FeedError::TooSoon`] if `now` precedes
    ///   `last_update_time + update_interval`
    pub fn record(
        &mut self,
        price: i64,
        now: u64,
        config: &OracleConfig,
    ) -> Result<PriceObservation> {
        if price < config.min_answer || price > config.max_answer {
            return Err(FeedError::OutOfBounds {
                price,
                min: config.min_answer,
                max: config.max_answer,
            });
        }

        let earliest = self.last_update_time.saturating_add(config.update_interval);
        if now < earliest {
            return Err(FeedError::TooSoon { now, earliest });
        }

        let observation = PriceObservation {
            round_id: self.current_round_id(),
            price,
            timestamp: now,
            valid: true,
        };
        self.history.push(observation);
        self.last_update_time = now;

        tracing::info!(
            round_id = observation.round_id,
            price,
            timestamp = now,
            category = %self.category,
            "ledger: observation accepted"
        );

        Ok(observation)
    }

    /// Most recently accepted observation.
    ///
    /// # Errors
    ///
    /// - [`FeedError::NotFound`] if no observation has ever been accepted
    pub fn latest(&self) -> Result<PriceObservation> {
        self.history.last().copied().ok_or(FeedError::NotFound)
    }

    /// Observation for a specific round.
    ///
    /// # Errors
    ///
    /// - [`FeedError::InvalidRound`] if `round_id` is zero or has not been
    ///   assigned yet
    pub fn at(&self, round_id: RoundId) -> Result<PriceObservation> {
        if round_id == 0 || round_id >= self.current_round_id() {
            return Err(FeedError::InvalidRound(round_id));
        }
        Ok(self.history[(round_id - 1) as usize])
    }

    /// Observations for rounds `start..=end`, in ascending round order.
    ///
    /// Only the validated window is touched; the result holds exactly
    /// `end - start + 1` items.
    ///
    /// # Errors
    ///
    /// - [`FeedError::InvalidRange`] unless
    ///   `start > 0 && end >= start && end < current_round_id`
    pub fn range(&self, start: RoundId, end: RoundId) -> Result<Vec<PriceObservation>> {
        if start == 0 || end < start || end >= self.current_round_id() {
            return Err(FeedError::InvalidRange { start, end });
        }
        Ok(self.history[(start - 1) as usize..end as usize].to_vec())
    }
}
