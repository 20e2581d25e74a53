//! # argus-types
//!
//! Shared domain types used across the Argus workspace.
//! A feed instance tracks one commodity; everything that crosses a crate
//! or process boundary lives here.

pub mod events;
pub mod feed;

/// Common type aliases.
pub type AccountId = [u8; 32];
pub type RoundId = u64;

/// The all-zero account id. Never a valid writer identity.
pub const ZERO_ACCOUNT: AccountId = [0u8; 32];

/// Round id assigned to the first accepted observation.
pub const GENESIS_ROUND_ID: RoundId = 1;
