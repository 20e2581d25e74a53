//! Validation rules for the feed parameters.
//!
//! A config is validated before installation, both at initialization and on
//! every replacement. Installed history is never re-validated against a new
//! config.

use argus_types::feed::OracleConfig;

use crate::{FeedError, Result};

/// Check a proposed config against the invariants required for installation.
///
/// Checks run in a fixed order and the first violated one decides the error
/// message: `update_interval > 0`, `deviation_threshold > 0`,
/// `heartbeat > 0`, `min_answer < max_answer`.
///
/// # Errors
///
/// - [`FeedError::InvalidConfig`] naming the violated field
pub fn validate(config: &OracleConfig) -> Result<()> {
    if config.update_interval == 0 {
        return Err(FeedError::InvalidConfig(
            "update_interval must be positive".to_string(),
        ));
    }
    if config.deviation_threshold == 0 {
        return Err(FeedError::InvalidConfig(
            "deviation_threshold must be positive".to_string(),
        ));
    }
    if config.heartbeat == 0 {
        return Err(FeedError::InvalidConfig(
            "heartbeat must be positive".to_string(),
        ));
    }
    if config.min_answer >= config.max_answer {
        return Err(FeedError::InvalidConfig(
            "min_answer must be strictly below max_answer".to_string(),
        ));
    }
    Ok(())
}
