//! Mock configuration.

use serde::{Deserialize, Serialize};

/// Metadata key used by default for normalized responses
pub const DEFAULT_METADATA_KEY: &str = "$metadata";

/// Configuration for a [`ClientMock`](crate::ClientMock)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Status code injected into synthesized response metadata
    pub status_code: u16,
    /// Key of the metadata container in normalized responses
    pub metadata_key: String,
    /// Turn handler panics into `HandlerPanicked` errors
    pub catch_panics: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            status_code: 200,
            metadata_key: DEFAULT_METADATA_KEY.to_string(),
            catch_panics: true,
        }
    }
}

impl MockConfig {
    /// Create a new config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the synthesized status code
    #[must_use]
    pub const fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    /// Set the metadata container key
    #[must_use]
    pub fn with_metadata_key(mut self, key: &str) -> Self {
        self.metadata_key = key.to_string();
        self
    }

    /// Enable or disable panic capture
    #[must_use]
    pub const fn with_catch_panics(mut self, enabled: bool) -> Self {
        self.catch_panics = enabled;
        self
    }
}
