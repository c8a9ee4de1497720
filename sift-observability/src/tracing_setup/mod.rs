//! Tracing setup: subscriber installation, span definitions and event helpers.

pub mod events;
pub mod spans;

use std::sync::Once;

use sift_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive.
pub const LOG_ENV_VAR: &str = "SIFT_LOG";

static INIT: Once = Once::new();

/// Initialize the tracing subscriber with default settings.
///
/// Respects the `SIFT_LOG` environment variable for filtering.
/// Defaults to `info` level if not set.
pub fn init_tracing() {
    init_tracing_from_config(&ObservabilityConfig::default());
}

/// Initialize the tracing subscriber from configuration. `SIFT_LOG` wins
/// over `log_level`. Only the first call in a process has any effect.
pub fn init_tracing_from_config(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    install(filter, config.json_logs);
}

/// Initialize tracing with a custom filter string (for testing or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    install(EnvFilter::new(filter), true);
}

fn install(filter: EnvFilter, json: bool) {
    INIT.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true);
        // Another subscriber may already be installed by the host process.
        let _ = if json {
            builder
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .try_init()
        } else {
            builder.try_init()
        };
    });
}
