//! # Telemetry
//!
//! `tracing-subscriber` setup for binaries embedding the synchronizer.
//!
//! The `RUST_LOG` environment variable wins over the configured level.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::SyncConfig;

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed (e.g. by another
/// test or by the host application).
pub fn init_tracing(config: &SyncConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let config = SyncConfig::for_testing();
        let _ = init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
