//! Integration test crate for the Argus price feed.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise end-to-end feed flows across the workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p argus-integration-tests
//! ```
