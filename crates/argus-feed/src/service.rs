//! The commodity feed service.
//!
//! [`CommodityFeed`] owns all mutable feed state behind a single
//! reader-writer lock. Mutating operations hold the write lock across their
//! entire validation-and-mutate span and release it on every exit path, so
//! each call appears atomic to all observers and a rejected call leaves
//! state untouched. Reads take the read lock and never see a half-applied
//! update.
//!
//! Admission checks run in a fixed order: authorization, suspension,
//! bounds, spacing. The first violated check decides the error.
//!
//! The reference feed adapter is only ever invoked after all locks are
//! dropped; it can neither block the ledger nor corrupt it.

use std::sync::Arc;

use argus_types::events::FeedEvent;
use argus_types::feed::{OracleConfig, PriceObservation};
use argus_types::{AccountId, RoundId, ZERO_ACCOUNT};
use tokio::sync::{broadcast, RwLock};

use crate::events::EventBus;
use crate::ledger::PriceLedger;
use crate::reference::{self, ReferenceFeed};
use crate::{config, staleness, FeedError, Result};

/// Per-subscriber buffer capacity of the change notification bus.
const EVENT_BUS_CAPACITY: usize = 256;

/// Initialized feed state. Lives only behind the service lock.
struct FeedInner {
    ledger: PriceLedger,
    config: OracleConfig,
    writer: AccountId,
    suspended: bool,
    adapter: Arc<dyn ReferenceFeed>,
}

/// A single-commodity price feed with gated writes and snapshot reads.
pub struct CommodityFeed {
    state: RwLock<Option<FeedInner>>,
    events: EventBus,
}

impl CommodityFeed {
    /// Create an uninitialized feed.
    ///
    /// Every operation fails with [`FeedError::NotInitialized`] until
    /// [`initialize`](Self::initialize) has run.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(None),
            events: EventBus::new(EVENT_BUS_CAPACITY),
        }
    }

    /// One-time setup of the feed.
    ///
    /// Fixes the commodity `category`, the reference `adapter`, the initial
    /// validation `config`, and the single authorized `writer`. `now` seeds
    /// the ledger's `last_update_time`, so the first observation is admitted
    /// no earlier than `now + update_interval`.
    ///
    /// # Errors
    ///
    /// - [`FeedError::AlreadyInitialized`] on any call after the first
    /// - [`FeedError::InvalidConfig`] if `category` is empty, `writer` is
    ///   the zero account, or `config` violates its invariants
    pub async fn initialize(
        &self,
        category: &str,
        adapter: Arc<dyn ReferenceFeed>,
        config: OracleConfig,
        writer: AccountId,
        now: u64,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        if state.is_some() {
            return Err(FeedError::AlreadyInitialized);
        }
        if category.is_empty() {
            return Err(FeedError::InvalidConfig(
                "category must be non-empty".to_string(),
            ));
        }
        if writer == ZERO_ACCOUNT {
            return Err(FeedError::InvalidConfig(
                "writer identity must be non-zero".to_string(),
            ));
        }
        config::validate(&config)?;

        *state = Some(FeedInner {
            ledger: PriceLedger::new(category.to_string(), now),
            config,
            writer,
            suspended: false,
            adapter,
        });
        tracing::info!(category, created_at = now, "feed: initialized");
        Ok(())
    }

    /// Validate and record a new observation, returning its round id.
    ///
    /// Emits [`FeedEvent::PriceUpdated`] on success. A rejected call leaves
    /// the feed unchanged.
    ///
    /// # Errors
    ///
    /// In admission order, fail-fast:
    ///
    /// - [`FeedError::Unauthorized`] if `caller` is not the writer
    /// - [`FeedError::Suspended`] while the feed is suspended
    /// - [`FeedError::OutOfBounds`] if `price` violates the configured bounds
    /// - [`FeedError::TooSoon`] if the update interval has not elapsed
    pub async fn append(&self, caller: AccountId, price: i64, now: u64) -> Result<RoundId> {
        let mut state = self.state.write().await;
        let inner = state.as_mut().ok_or(FeedError::NotInitialized)?;
        if caller != inner.writer {
            return Err(FeedError::Unauthorized);
        }
        if inner.suspended {
            return Err(FeedError::Suspended);
        }

        let observation = inner.ledger.record(price, now, &inner.config)?;

        // Emitted before the write lock drops so event order matches the
        // order of successful appends.
        self.events.emit(FeedEvent::PriceUpdated {
            round_id: observation.round_id,
            price: observation.price,
            timestamp: observation.timestamp,
            category: inner.ledger.category().to_string(),
        });

        Ok(observation.round_id)
    }

    /// Replace the validation parameters.
    ///
    /// Gated exactly like [`append`](Self::append): writer-only and blocked
    /// while suspended. The new config is validated before installation and
    /// a failure leaves the previous config observable. Installed history
    /// is never re-validated. Emits [`FeedEvent::ConfigUpdated`] on success.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Unauthorized`] if `caller` is not the writer
    /// - [`FeedError::Suspended`] while the feed is suspended
    /// - [`FeedError::InvalidConfig`] if `new_config` violates its invariants
    pub async fn replace_config(
        &self,
        caller: AccountId,
        new_config: OracleConfig,
        now: u64,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let inner = state.as_mut().ok_or(FeedError::NotInitialized)?;
        if caller != inner.writer {
            return Err(FeedError::Unauthorized);
        }
        if inner.suspended {
            return Err(FeedError::Suspended);
        }
        config::validate(&new_config)?;

        inner.config = new_config;
        self.events.emit(FeedEvent::ConfigUpdated {
            update_interval: new_config.update_interval,
            deviation_threshold: new_config.deviation_threshold,
            heartbeat: new_config.heartbeat,
            timestamp: now,
        });
        tracing::info!(
            update_interval = new_config.update_interval,
            heartbeat = new_config.heartbeat,
            deviation_threshold = new_config.deviation_threshold,
            "feed: config replaced"
        );
        Ok(())
    }

    /// Most recently accepted observation.
    ///
    /// # Errors
    ///
    /// - [`FeedError::NotFound`] if no observation has ever been accepted
    pub async fn latest(&self) -> Result<PriceObservation> {
        let state = self.state.read().await;
        let inner = state.as_ref().ok_or(FeedError::NotInitialized)?;
        inner.ledger.latest()
    }

    /// Observation for a specific round.
    ///
    /// # Errors
    ///
    /// - [`FeedError::InvalidRound`] if `round_id` is zero or unassigned
    pub async fn at(&self, round_id: RoundId) -> Result<PriceObservation> {
        let state = self.state.read().await;
        let inner = state.as_ref().ok_or(FeedError::NotInitialized)?;
        inner.ledger.at(round_id)
    }

    /// Observations for rounds `start..=end`, ascending.
    ///
    /// # Errors
    ///
    /// - [`FeedError::InvalidRange`] if the window is not fully recorded
    pub async fn range(&self, start: RoundId, end: RoundId) -> Result<Vec<PriceObservation>> {
        let state = self.state.read().await;
        let inner = state.as_ref().ok_or(FeedError::NotInitialized)?;
        inner.ledger.range(start, end)
    }

    /// Round id the next accepted observation will receive.
    pub async fn current_round_id(&self) -> Result<RoundId> {
        let state = self.state.read().await;
        let inner = state.as_ref().ok_or(FeedError::NotInitialized)?;
        Ok(inner.ledger.current_round_id())
    }

    /// Commodity identifier fixed at initialization.
    pub async fn category(&self) -> Result<String> {
        let state = self.state.read().await;
        let inner = state.as_ref().ok_or(FeedError::NotInitialized)?;
        Ok(inner.ledger.category().to_string())
    }

    /// Currently installed validation parameters.
    pub async fn get_config(&self) -> Result<OracleConfig> {
        let state = self.state.read().await;
        let inner = state.as_ref().ok_or(FeedError::NotInitialized)?;
        Ok(inner.config)
    }

    /// Whether the feed is stale at `now` (heartbeat exceeded).
    pub async fn is_stale(&self, now: u64) -> Result<bool> {
        let state = self.state.read().await;
        let inner = state.as_ref().ok_or(FeedError::NotInitialized)?;
        Ok(staleness::is_stale(
            inner.ledger.last_update_time(),
            inner.config.heartbeat,
            now,
        ))
    }

    /// Seconds elapsed at `now` since the last accepted observation.
    pub async fn time_since_update(&self, now: u64) -> Result<u64> {
        let state = self.state.read().await;
        let inner = state.as_ref().ok_or(FeedError::NotInitialized)?;
        Ok(staleness::time_since_update(
            inner.ledger.last_update_time(),
            now,
        ))
    }

    /// Fetch and validate a cross-check price from the reference feed.
    ///
    /// The adapter is invoked after the read lock is dropped; its output is
    /// validated here regardless of what the adapter claims to have checked.
    /// Never consulted by the admission path.
    ///
    /// # Errors
    ///
    /// - [`FeedError::StaleReference`] if the quote is older than the
    ///   heartbeat
    /// - [`FeedError::InvalidReference`] if the quoted price is not positive
    /// - any error the adapter itself reports
    pub async fn fetch_reference_price(&self, now: u64) -> Result<i64> {
        let (adapter, heartbeat) = {
            let state = self.state.read().await;
            let inner = state.as_ref().ok_or(FeedError::NotInitialized)?;
            (Arc::clone(&inner.adapter), inner.config.heartbeat)
        };

        let quote = adapter.fetch_reference()?;
        reference::validate_reference(quote, now, heartbeat)
    }

    /// Suspend all mutating operations.
    ///
    /// Intended for the administrative authority above this crate; the feed
    /// itself does not check who calls it.
    pub async fn suspend(&self) -> Result<()> {
        let mut state = self.state.write().await;
        let inner = state.as_mut().ok_or(FeedError::NotInitialized)?;
        inner.suspended = true;
        tracing::warn!("feed: suspended");
        Ok(())
    }

    /// Lift a suspension.
    pub async fn resume(&self) -> Result<()> {
        let mut state = self.state.write().await;
        let inner = state.as_mut().ok_or(FeedError::NotInitialized)?;
        inner.suspended = false;
        tracing::info!("feed: resumed");
        Ok(())
    }

    /// Whether mutating operations are currently suspended.
    pub async fn is_suspended(&self) -> Result<bool> {
        let state = self.state.read().await;
        let inner = state.as_ref().ok_or(FeedError::NotInitialized)?;
        Ok(inner.suspended)
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }
}

impl Default for CommodityFeed {
    fn default() -> Self {
        Self::new()
    }
}
