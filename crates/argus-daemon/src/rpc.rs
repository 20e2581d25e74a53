//! JSON-RPC server over Unix socket.
//!
//! Listens on a Unix domain socket, accepts connections, and dispatches
//! JSON-RPC method calls to the feed command handlers. Requests and
//! responses are newline-delimited JSON objects.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tracing::{debug, error, info, warn};

use crate::commands;
use crate::DaemonState;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Method name.
    pub method: String,
    /// Parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    /// JSON-RPC version.
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Result or error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcError {
    /// Error code.
    pub code: i32,
    /// Error name.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Create a success response.
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl RpcError {
    // Standard JSON-RPC errors

    /// Parse error (-32700).
    pub fn parse_error() -> Self {
        Self {
            code: -32700,
            message: "PARSE_ERROR".to_string(),
            data: None,
        }
    }

    /// Method not found (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "METHOD_NOT_FOUND".to_string(),
            data: Some(serde_json::json!({"method": method})),
        }
    }

    /// Invalid params (-32602).
    pub fn invalid_params(detail: &str) -> Self {
        Self {
            code: -32602,
            message: "INVALID_PARAMS".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Internal error (-32603).
    pub fn internal_error(detail: &str) -> Self {
        Self {
            code: -32603,
            message: "INTERNAL_ERROR".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    // Feed errors

    /// Caller not authorized (-32020).
    pub fn unauthorized() -> Self {
        Self {
            code: -32020,
            message: "UNAUTHORIZED".to_string(),
            data: None,
        }
    }

    /// Feed suspended (-32021).
    pub fn feed_suspended() -> Self {
        Self {
            code: -32021,
            message: "FEED_SUSPENDED".to_string(),
            data: None,
        }
    }

    /// Price out of bounds (-32022).
    pub fn price_out_of_bounds(price: i64, min: i64, max: i64) -> Self {
        Self {
            code: -32022,
            message: "PRICE_OUT_OF_BOUNDS".to_string(),
            data: Some(serde_json::json!({"price": price, "min": min, "max": max})),
        }
    }

    /// Update submitted before the interval elapsed (-32023).
    pub fn update_too_soon(now: u64, earliest: u64) -> Self {
        Self {
            code: -32023,
            message: "UPDATE_TOO_SOON".to_string(),
            data: Some(serde_json::json!({"now": now, "earliest": earliest})),
        }
    }

    /// Proposed config rejected (-32024).
    pub fn invalid_config(detail: &str) -> Self {
        Self {
            code: -32024,
            message: "INVALID_CONFIG".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// No observations recorded yet (-32025).
    pub fn no_observations() -> Self {
        Self {
            code: -32025,
            message: "NO_OBSERVATIONS".to_string(),
            data: None,
        }
    }

    /// Round id outside the recorded round space (-32026).
    pub fn invalid_round(round_id: u64) -> Self {
        Self {
            code: -32026,
            message: "INVALID_ROUND".to_string(),
            data: Some(serde_json::json!({"round_id": round_id})),
        }
    }

    /// Round range outside the recorded round space (-32027).
    pub fn invalid_range(start: u64, end: u64) -> Self {
        Self {
            code: -32027,
            message: "INVALID_RANGE".to_string(),
            data: Some(serde_json::json!({"start": start, "end": end})),
        }
    }

    /// Reference quote older than the heartbeat (-32028).
    pub fn stale_reference(observed_at: u64, now: u64, heartbeat: u64) -> Self {
        Self {
            code: -32028,
            message: "STALE_REFERENCE".to_string(),
            data: Some(serde_json::json!({
                "observed_at": observed_at,
                "now": now,
                "heartbeat": heartbeat,
            })),
        }
    }

    /// Reference quote not positive (-32029).
    pub fn invalid_reference(price: i64) -> Self {
        Self {
            code: -32029,
            message: "INVALID_REFERENCE".to_string(),
            data: Some(serde_json::json!({"price": price})),
        }
    }

    /// Feed not initialized (-32030).
    pub fn feed_not_initialized() -> Self {
        Self {
            code: -32030,
            message: "FEED_NOT_INITIALIZED".to_string(),
            data: None,
        }
    }

    /// Feed already initialized (-32031).
    pub fn feed_already_initialized() -> Self {
        Self {
            code: -32031,
            message: "FEED_ALREADY_INITIALIZED".to_string(),
            data: None,
        }
    }
}

/// The RPC server.
pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    /// Create a new RPC server.
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Run the server, accepting connections.
    pub async fn run(&self) -> anyhow::Result<()> {
        // Remove stale socket file
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(state, stream).await {
                            warn!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection.
async fn handle_connection(
    state: Arc<DaemonState>,
    stream: tokio::net::UnixStream,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // EOF
        }

        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) => dispatch_request(state.clone(), request).await,
            Err(_) => RpcResponse::error(serde_json::Value::Null, RpcError::parse_error()),
        };

        let mut response_json = serde_json::to_string(&response)?;
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Dispatch a JSON-RPC request to the appropriate command handler.
async fn dispatch_request(state: Arc<DaemonState>, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    let method = request.method.as_str();

    debug!("Dispatching RPC method: {}", method);

    let result = match method {
        // Write path
        "submit_price" => commands::feed::submit_price(&state, &request.params).await,
        "replace_config" => commands::feed::replace_config(&state, &request.params).await,

        // Read path
        "get_latest_observation" => commands::feed::get_latest_observation(&state).await,
        "get_observation" => commands::feed::get_observation(&state, &request.params).await,
        "get_observation_range" => {
            commands::feed::get_observation_range(&state, &request.params).await
        }
        "get_current_round" => commands::feed::get_current_round(&state).await,
        "get_config" => commands::feed::get_config(&state).await,
        "get_staleness" => commands::feed::get_staleness(&state).await,
        "get_reference_price" => commands::feed::get_reference_price(&state).await,

        // Admin
        "suspend_feed" => commands::feed::suspend_feed(&state, &request.params).await,
        "resume_feed" => commands::feed::resume_feed(&state, &request.params).await,

        // Dev-only commands
        "dev_set_reference" => commands::feed::dev_set_reference(&state, &request.params).await,

        _ => Err(RpcError::method_not_found(method)),
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => RpcResponse::error(id, err),
    }
}
