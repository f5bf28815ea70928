//! Test Log Output
//!
//! Every dispatch, installation, and restore emits `tracing` events under the
//! `cmdmock` target. Nothing is printed unless a subscriber is installed;
//! [`init_test_tracing`] installs one that writes through the test harness
//! capture.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor the config names one
pub const DEFAULT_FILTER: &str = "cmdmock=debug";

/// Subscriber settings for test runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set
    pub filter: String,
    /// Emit one JSON object per event instead of the human format
    pub json: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            json: false,
        }
    }
}

impl TracingConfig {
    /// Create a new config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter directives
    #[must_use]
    pub fn with_filter(mut self, filter: &str) -> Self {
        self.filter = filter.to_string();
        self
    }

    /// Switch to JSON output
    #[must_use]
    pub const fn json(mut self) -> Self {
        self.json = true;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.filter))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the default test subscriber
///
/// Returns `false` when a global subscriber was already set, which is the
/// normal case for every test after the first.
pub fn init_test_tracing() -> bool {
    init_with(&TracingConfig::default())
}

/// Install a test subscriber built from `config`
pub fn init_with(config: &TracingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_target(true)
        .with_test_writer();
    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.compact().try_init().is_ok()
    };
    if installed {
        tracing::debug!(filter = %config.filter, json = config.json, "test tracing installed");
    }
    installed
}
