//! Configuration file management.

use std::path::PathBuf;

use argus_types::feed::OracleConfig;
use argus_types::AccountId;
use serde::{Deserialize, Serialize};

/// Writer identity used when no key is configured. Dev deployments only.
pub const DEV_WRITER_KEY: AccountId = [0x11; 32];

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Feed settings.
    #[serde(default)]
    pub feed: FeedSettings,
    /// Reference feed settings.
    #[serde(default)]
    pub reference: ReferenceSettings,
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    /// Commodity category identifier.
    #[serde(default = "default_category")]
    pub category: String,
    /// Inclusive lower price bound.
    #[serde(default = "default_min_answer")]
    pub min_answer: i64,
    /// Inclusive upper price bound.
    #[serde(default = "default_max_answer")]
    pub max_answer: i64,
    /// Minimum seconds between accepted observations.
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,
    /// Staleness deadline in seconds.
    #[serde(default = "default_heartbeat")]
    pub heartbeat: u64,
    /// Deviation threshold. Validated, not consulted on admission.
    #[serde(default = "default_deviation_threshold")]
    pub deviation_threshold: u64,
    /// Hex-encoded 32-byte writer identity. Empty = dev writer.
    #[serde(default)]
    pub writer_key: String,
    /// Hex-encoded 32-byte admin identity. Empty = same as writer.
    #[serde(default)]
    pub admin_key: String,
}

/// Reference feed (stub) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceSettings {
    /// Initial stub quote. 0 = unset; fetches fail until a dev override.
    #[serde(default)]
    pub price: i64,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
}

// Default value functions

fn default_category() -> String {
    "XAU".to_string()
}

fn default_min_answer() -> i64 {
    1
}

fn default_max_answer() -> i64 {
    1_000_000_000_000
}

fn default_update_interval() -> u64 {
    3600
}

fn default_heartbeat() -> u64 {
    86400
}

fn default_deviation_threshold() -> u64 {
    100
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            category: default_category(),
            min_answer: default_min_answer(),
            max_answer: default_max_answer(),
            update_interval: default_update_interval(),
            heartbeat: default_heartbeat(),
            deviation_threshold: default_deviation_threshold(),
            writer_key: String::new(),
            admin_key: String::new(),
        }
    }
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self { price: 0 }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: DaemonConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Validation parameters the feed is initialized with.
    pub fn oracle_config(&self) -> OracleConfig {
        OracleConfig {
            min_answer: self.feed.min_answer,
            max_answer: self.feed.max_answer,
            update_interval: self.feed.update_interval,
            heartbeat: self.feed.heartbeat,
            deviation_threshold: self.feed.deviation_threshold,
        }
    }

    /// Writer identity allowed to submit observations.
    pub fn writer(&self) -> anyhow::Result<AccountId> {
        if self.feed.writer_key.is_empty() {
            return Ok(DEV_WRITER_KEY);
        }
        parse_account_key(&self.feed.writer_key, "feed.writer_key")
    }

    /// Admin identity allowed to suspend and resume the feed.
    pub fn admin(&self) -> anyhow::Result<AccountId> {
        if self.feed.admin_key.is_empty() {
            return self.writer();
        }
        parse_account_key(&self.feed.admin_key, "feed.admin_key")
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        // Check env var override first
        if let Ok(dir) = std::env::var("ARGUS_DATA_DIR") {
            return PathBuf::from(dir).join("config.toml");
        }
        Self::default_data_dir().join("config.toml")
    }

    /// Platform-specific default data directory.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("ARGUS_DATA_DIR") {
            return PathBuf::from(dir);
        }
        #[cfg(target_os = "macos")]
        {
            dirs_fallback("Library/Application Support/Argus")
        }
        #[cfg(target_os = "linux")]
        {
            dirs_fallback(".argus")
        }
        #[cfg(target_os = "windows")]
        {
            dirs_fallback("Argus")
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            dirs_fallback(".argus")
        }
    }
}

/// Parse a hex-encoded 32-byte account key.
fn parse_account_key(hex_key: &str, field: &str) -> anyhow::Result<AccountId> {
    let bytes =
        hex::decode(hex_key).map_err(|e| anyhow::anyhow!("{field} is not valid hex: {e}"))?;
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("{field} must encode exactly 32 bytes"))
}

/// Fallback home directory resolution.
fn dirs_fallback(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| PathBuf::from("/tmp/argus"))
}
