//! Wall-clock access.
//!
//! Every daemon-side timestamp comes from here. The feed library itself
//! never reads the system clock; it is handed `now` on each call.

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
