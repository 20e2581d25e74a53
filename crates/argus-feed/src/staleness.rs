//! Heartbeat staleness checks.
//!
//! A feed is stale when its newest accepted observation is older than the
//! configured heartbeat. Both functions are pure: the caller supplies the
//! clock, which keeps every check deterministic and side-effect free.

/// Whether the feed is stale at `now`.
///
/// True iff `now > last_update_time + heartbeat`. Ages are computed with
/// saturating arithmetic, so a clock running behind `last_update_time`
/// reads as fresh.
///
/// # Examples
///
/// ```
/// use argus_feed::staleness::is_stale;
///
/// assert!(!is_stale(1_000, 60, 1_060));
/// assert!(is_stale(1_000, 60, 1_061));
/// ```
pub fn is_stale(last_update_time: u64, heartbeat: u64, now: u64) -> bool {
    now.saturating_sub(last_update_time) > heartbeat
}

/// Seconds elapsed since the last accepted observation.
///
/// Saturates to zero when `now` precedes `last_update_time`.
pub fn time_since_update(last_update_time: u64, now: u64) -> u64 {
    now.saturating_sub(last_update_time)
}
