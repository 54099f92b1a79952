//! # Sync Configuration
//!
//! Configuration for the chain synchronizer.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `NEM_SYNC_NETWORK` | `mainnet` | Expected network of the remote node |
//! | `NEM_SYNC_POLL_INTERVAL_MS` | `15000` | Delay between sync cycles |
//! | `NEM_SYNC_REQUEST_TIMEOUT_MS` | `10000` | Timeout per remote query |
//! | `NEM_SYNC_FETCH_CONCURRENCY` | `8` | Block downloads in flight |
//! | `NEM_SYNC_MAX_ROLLBACK` | `360` | Deepest fork we can follow |
//! | `NEM_SYNC_MAX_BLOCKS_PER_CYCLE` | `100` | Blocks downloaded per cycle while catching up |
//! | `NEM_SYNC_LOG_LEVEL` or `RUST_LOG` | `info` | Log level filter |
//! | `NEM_SYNC_JSON_LOGS` | `false` | JSON formatted logs |

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::domain::{ConfigurationError, Network, DEFAULT_MAX_ROLLBACK};

/// Largest accepted `max_rollback_blocks`.
pub const MAX_ROLLBACK_LIMIT: usize = 100_000;

/// Largest accepted `event_channel_capacity`.
pub const MAX_EVENT_CHANNEL_CAPACITY: usize = 1 << 16;

/// Chain synchronizer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Network the remote node must serve.
    pub network: Network,

    /// Delay between scheduling ticks in milliseconds.
    pub poll_interval_ms: u64,

    /// Timeout for a single remote query in milliseconds.
    pub request_timeout_ms: u64,

    /// Maximum block downloads in flight during one cycle.
    pub fetch_concurrency: usize,

    /// Blocks kept below the tip for fork resolution.
    pub max_rollback_blocks: usize,

    /// Blocks fetched above the common ancestor in one cycle.
    pub max_blocks_per_cycle: usize,

    /// First retry delay after a remote failure in milliseconds.
    pub retry_base_delay_ms: u64,

    /// Upper bound for the retry delay in milliseconds.
    pub retry_max_delay_ms: u64,

    /// Capacity of the reorg and error broadcast channels.
    pub event_channel_capacity: usize,

    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON formatted logs.
    pub json_logs: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            network: Network::MainNet,
            poll_interval_ms: 15_000,
            request_timeout_ms: 10_000,
            fetch_concurrency: 8,
            max_rollback_blocks: DEFAULT_MAX_ROLLBACK,
            max_blocks_per_cycle: 100,
            retry_base_delay_ms: 1_000,
            retry_max_delay_ms: 60_000,
            event_channel_capacity: 64,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl SyncConfig {
    /// Create a config for testing (fast ticks, short timeouts).
    pub fn for_testing() -> Self {
        Self {
            network: Network::TestNet,
            poll_interval_ms: 10,
            request_timeout_ms: 200,
            fetch_concurrency: 4,
            max_rollback_blocks: 16,
            max_blocks_per_cycle: 32,
            retry_base_delay_ms: 5,
            retry_max_delay_ms: 50,
            event_channel_capacity: 16,
            log_level: "debug".to_string(),
            json_logs: false,
        }
    }

    /// Defaults overridden by `NEM_SYNC_*` environment variables.
    ///
    /// Unparsable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            network: env::var("NEM_SYNC_NETWORK")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.network),

            poll_interval_ms: env_parse("NEM_SYNC_POLL_INTERVAL_MS", defaults.poll_interval_ms),

            request_timeout_ms: env_parse(
                "NEM_SYNC_REQUEST_TIMEOUT_MS",
                defaults.request_timeout_ms,
            ),

            fetch_concurrency: env_parse("NEM_SYNC_FETCH_CONCURRENCY", defaults.fetch_concurrency),

            max_rollback_blocks: env_parse("NEM_SYNC_MAX_ROLLBACK", defaults.max_rollback_blocks),

            max_blocks_per_cycle: env_parse(
                "NEM_SYNC_MAX_BLOCKS_PER_CYCLE",
                defaults.max_blocks_per_cycle,
            ),

            retry_base_delay_ms: env_parse(
                "NEM_SYNC_RETRY_BASE_DELAY_MS",
                defaults.retry_base_delay_ms,
            ),

            retry_max_delay_ms: env_parse(
                "NEM_SYNC_RETRY_MAX_DELAY_MS",
                defaults.retry_max_delay_ms,
            ),

            event_channel_capacity: defaults.event_channel_capacity,

            log_level: env::var("NEM_SYNC_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: env::var("NEM_SYNC_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),
        }
    }

    /// Parse a JSON config document; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigurationError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the synchronizer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let positive = [
            ("poll_interval_ms", self.poll_interval_ms),
            ("request_timeout_ms", self.request_timeout_ms),
            ("fetch_concurrency", self.fetch_concurrency as u64),
            ("max_blocks_per_cycle", self.max_blocks_per_cycle as u64),
            ("retry_base_delay_ms", self.retry_base_delay_ms),
            ("event_channel_capacity", self.event_channel_capacity as u64),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigurationError::InvalidConfig(format!(
                "{name} must be positive"
            )));
        }
        if self.max_rollback_blocks > MAX_ROLLBACK_LIMIT {
            return Err(ConfigurationError::InvalidConfig(format!(
                "max_rollback_blocks must be <= {MAX_ROLLBACK_LIMIT}"
            )));
        }
        if self.event_channel_capacity > MAX_EVENT_CHANNEL_CAPACITY {
            return Err(ConfigurationError::InvalidConfig(format!(
                "event_channel_capacity must be <= {MAX_EVENT_CHANNEL_CAPACITY}"
            )));
        }
        if self.retry_max_delay_ms < self.retry_base_delay_ms {
            return Err(ConfigurationError::InvalidConfig(
                "retry_max_delay_ms must be >= retry_base_delay_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// First retry delay.
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Retry delay cap.
    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
