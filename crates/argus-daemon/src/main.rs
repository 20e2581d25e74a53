//! argus-daemon: the Argus price feed daemon.
//!
//! Single OS process running a Tokio async runtime. It owns one commodity
//! feed, initialized once at startup from the TOML config, and serves it
//! to clients via JSON-RPC over Unix socket.

mod clock;
mod commands;
mod config;
mod rpc;

use std::sync::Arc;

use argus_feed::reference::FixedReferenceFeed;
use argus_feed::service::CommodityFeed;
use argus_types::AccountId;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::config::DaemonConfig;
use crate::rpc::RpcServer;

/// Daemon-wide shared state.
pub struct DaemonState {
    /// The commodity feed.
    pub feed: Arc<CommodityFeed>,
    /// Stub reference feed, kept concrete so dev commands can reach it.
    pub reference: Arc<FixedReferenceFeed>,
    /// Admin identity allowed to suspend and resume the feed.
    pub admin: AccountId,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("argus=info".parse()?),
        )
        .init();

    info!("Argus daemon starting");

    // 1. Load config
    let config = DaemonConfig::load()?;
    let data_dir = config.data_dir();

    // Ensure data directory exists
    std::fs::create_dir_all(&data_dir)?;

    let writer = config.writer()?;
    let admin = config.admin()?;
    if config.feed.writer_key.is_empty() {
        warn!("feed: no writer_key configured, using dev writer identity");
    }

    // 2. Build the feed and initialize it once
    let now = clock::unix_now();
    let reference = Arc::new(FixedReferenceFeed::new(config.reference.price, now));
    let feed = Arc::new(CommodityFeed::new());
    feed.initialize(
        &config.feed.category,
        reference.clone(),
        config.oracle_config(),
        writer,
        now,
    )
    .await?;

    // 3. Build daemon state
    let state = Arc::new(DaemonState {
        feed: feed.clone(),
        reference,
        admin,
    });

    // 4. Log feed events as they happen
    let mut events = feed.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => info!(?event, "feed event"),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "feed event logger lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // 5. Run the RPC server until shutdown
    let socket_path = data_dir.join("argus.sock");
    let rpc_server = RpcServer::new(state.clone(), socket_path.clone());

    info!("Starting JSON-RPC server on {:?}", socket_path);

    tokio::select! {
        result = rpc_server.run() => {
            if let Err(e) = result {
                error!("RPC server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    // Graceful shutdown
    info!("Daemon shutting down gracefully");

    // Clean up socket file
    let _ = std::fs::remove_file(&socket_path);

    info!("Daemon stopped");
    Ok(())
}
