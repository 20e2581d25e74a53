//! Feed command handlers.
//!
//! Each handler parses its params, invokes the feed, and maps the outcome
//! onto the JSON-RPC error table. Timestamps are read from the daemon
//! clock here, never inside the feed library.

use std::sync::Arc;

use argus_feed::FeedError;
use argus_types::feed::OracleConfig;
use argus_types::AccountId;
use serde_json::Value;

use crate::clock;
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Submit a new price observation.
pub async fn submit_price(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = parse_caller(params)?;
    let price = params
        .get("price")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("price required"))?;

    let round_id = state
        .feed
        .append(caller, price, clock::unix_now())
        .await
        .map_err(feed_error)?;

    Ok(serde_json::json!({"round_id": round_id}))
}

/// Get the most recent observation.
pub async fn get_latest_observation(state: &Arc<DaemonState>) -> Result {
    let observation = state.feed.latest().await.map_err(feed_error)?;
    to_json(&observation)
}

/// Get the observation for a specific round.
pub async fn get_observation(state: &Arc<DaemonState>, params: &Value) -> Result {
    let round_id = params
        .get("round_id")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("round_id required"))?;

    let observation = state.feed.at(round_id).await.map_err(feed_error)?;
    to_json(&observation)
}

/// Get the observations for an inclusive round range, ascending.
pub async fn get_observation_range(state: &Arc<DaemonState>, params: &Value) -> Result {
    let start = params
        .get("start_round")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("start_round required"))?;
    let end = params
        .get("end_round")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("end_round required"))?;

    let observations = state.feed.range(start, end).await.map_err(feed_error)?;
    to_json(&observations)
}

/// Get the round id the next accepted observation will receive.
pub async fn get_current_round(state: &Arc<DaemonState>) -> Result {
    let round_id = state.feed.current_round_id().await.map_err(feed_error)?;
    Ok(serde_json::json!({"current_round_id": round_id}))
}

/// Get the installed validation parameters.
pub async fn get_config(state: &Arc<DaemonState>) -> Result {
    let config = state.feed.get_config().await.map_err(feed_error)?;
    to_json(&config)
}

/// Replace the validation parameters. Writer only.
pub async fn replace_config(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = parse_caller(params)?;
    let min_answer = params
        .get("min_answer")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("min_answer required"))?;
    let max_answer = params
        .get("max_answer")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("max_answer required"))?;
    let update_interval = params
        .get("update_interval")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("update_interval required"))?;
    let heartbeat = params
        .get("heartbeat")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("heartbeat required"))?;
    let deviation_threshold = params
        .get("deviation_threshold")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("deviation_threshold required"))?;

    let new_config = OracleConfig {
        min_answer,
        max_answer,
        update_interval,
        heartbeat,
        deviation_threshold,
    };
    state
        .feed
        .replace_config(caller, new_config, clock::unix_now())
        .await
        .map_err(feed_error)?;

    Ok(serde_json::json!({"updated": true}))
}

/// Get the staleness status of the feed.
pub async fn get_staleness(state: &Arc<DaemonState>) -> Result {
    let now = clock::unix_now();
    let is_stale = state.feed.is_stale(now).await.map_err(feed_error)?;
    let seconds_since_update = state
        .feed
        .time_since_update(now)
        .await
        .map_err(feed_error)?;

    Ok(serde_json::json!({
        "is_stale": is_stale,
        "seconds_since_update": seconds_since_update,
    }))
}

/// Fetch a validated cross-check price from the reference feed.
pub async fn get_reference_price(state: &Arc<DaemonState>) -> Result {
    let price = state
        .feed
        .fetch_reference_price(clock::unix_now())
        .await
        .map_err(feed_error)?;

    Ok(serde_json::json!({"price": price}))
}

/// Suspend the feed. Admin only.
pub async fn suspend_feed(state: &Arc<DaemonState>, params: &Value) -> Result {
    require_admin(state, params)?;
    state.feed.suspend().await.map_err(feed_error)?;
    Ok(serde_json::json!({"suspended": true}))
}

/// Resume the feed. Admin only.
pub async fn resume_feed(state: &Arc<DaemonState>, params: &Value) -> Result {
    require_admin(state, params)?;
    state.feed.resume().await.map_err(feed_error)?;
    Ok(serde_json::json!({"suspended": false}))
}

/// Dev-only: replace the stub reference quote.
pub async fn dev_set_reference(state: &Arc<DaemonState>, params: &Value) -> Result {
    let price = params
        .get("price")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| RpcError::invalid_params("price required"))?;
    let observed_at = params
        .get("observed_at")
        .and_then(|v| v.as_u64())
        .unwrap_or_else(clock::unix_now);

    state.reference.set(price, observed_at);
    Ok(serde_json::json!({"reference_set": true}))
}

/// Parse the 32-byte caller identity from request params.
fn parse_caller(params: &Value) -> std::result::Result<AccountId, RpcError> {
    let caller_hex = params
        .get("caller")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("caller required"))?;
    let bytes = hex::decode(caller_hex)
        .map_err(|_| RpcError::invalid_params("caller must be hex-encoded"))?;
    bytes
        .try_into()
        .map_err(|_| RpcError::invalid_params("caller must encode exactly 32 bytes"))
}

/// Check that the calling identity is the configured admin.
fn require_admin(state: &Arc<DaemonState>, params: &Value) -> std::result::Result<(), RpcError> {
    let caller = parse_caller(params)?;
    if caller != state.admin {
        return Err(RpcError::unauthorized());
    }
    Ok(())
}

/// Serialize a response payload.
fn to_json<T: serde::Serialize>(value: &T) -> Result {
    serde_json::to_value(value).map_err(|e| RpcError::internal_error(&format!("serialize: {e}")))
}

/// Map a feed error onto its JSON-RPC error object.
fn feed_error(err: FeedError) -> RpcError {
    match err {
        FeedError::Unauthorized => RpcError::unauthorized(),
        FeedError::Suspended => RpcError::feed_suspended(),
        FeedError::OutOfBounds { price, min, max } => {
            RpcError::price_out_of_bounds(price, min, max)
        }
        FeedError::TooSoon { now, earliest } => RpcError::update_too_soon(now, earliest),
        FeedError::InvalidConfig(detail) => RpcError::invalid_config(&detail),
        FeedError::NotFound => RpcError::no_observations(),
        FeedError::InvalidRound(round_id) => RpcError::invalid_round(round_id),
        FeedError::InvalidRange { start, end } => RpcError::invalid_range(start, end),
        FeedError::StaleReference {
            observed_at,
            now,
            heartbeat,
        } => RpcError::stale_reference(observed_at, now, heartbeat),
        FeedError::InvalidReference(price) => RpcError::invalid_reference(price),
        FeedError::NotInitialized => RpcError::feed_not_initialized(),
        FeedError::AlreadyInitialized => RpcError::feed_already_initialized(),
    }
}
