//! External reference feed adapter.
//!
//! The reference feed is a read-only collaborator consulted for an optional
//! cross-check; it never gates admission and is never called while a ledger
//! lock is held. The core validates the adapter's output itself rather than
//! trusting the adapter to have done so.

use std::sync::{Mutex, PoisonError};

use crate::{FeedError, Result};

/// A price quote from an outside feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferencePrice {
    /// Quoted price.
    pub price: i64,
    /// Unix timestamp at which the outside feed observed the price.
    pub observed_at: u64,
}

/// Read-only adapter to an external price feed.
pub trait ReferenceFeed: Send + Sync {
    /// Fetch the current reference quote.
    ///
    /// Implementations may fail (unreachable upstream, malformed payload);
    /// failures propagate to the caller and never touch ledger state.
    fn fetch_reference(&self) -> Result<ReferencePrice>;
}

/// Validate an adapter's output against the feed heartbeat.
///
/// # Errors
///
/// - [`FeedError::StaleReference`] if the quote is older than `heartbeat`
///   seconds at `now`
/// - [`FeedError::InvalidReference`] if the quoted price is not positive
pub fn validate_reference(quote: ReferencePrice, now: u64, heartbeat: u64) -> Result<i64> {
    if now.saturating_sub(quote.observed_at) > heartbeat {
        return Err(FeedError::StaleReference {
            observed_at: quote.observed_at,
            now,
            heartbeat,
        });
    }
    if quote.price <= 0 {
        return Err(FeedError::InvalidReference(quote.price));
    }
    Ok(quote.price)
}

/// A reference feed returning a fixed, settable quote.
///
/// Stands in for a real outside feed in development and tests, the same way
/// a hardcoded rate oracle stands in before live infrastructure exists. The
/// quote can be adjusted at runtime via [`set`](FixedReferenceFeed::set).
#[derive(Debug)]
pub struct FixedReferenceFeed {
    quote: Mutex<ReferencePrice>,
}

impl FixedReferenceFeed {
    /// Create a feed quoting `price` as observed at `observed_at`.
    pub fn new(price: i64, observed_at: u64) -> Self {
        Self {
            quote: Mutex::new(ReferencePrice { price, observed_at }),
        }
    }

    /// Replace the quote (development/testing only).
    pub fn set(&self, price: i64, observed_at: u64) {
        tracing::warn!(price, observed_at, "reference: quote changed (dev only)");
        let mut quote = self.quote.lock().unwrap_or_else(PoisonError::into_inner);
        *quote = ReferencePrice { price, observed_at };
    }
}

impl ReferenceFeed for FixedReferenceFeed {
    fn fetch_reference(&self) -> Result<ReferencePrice> {
        Ok(*self.quote.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
