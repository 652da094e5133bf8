use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PAYLOAD_SIZE_THRESHOLD;
use crate::error::OffloadError;

/// Offload configuration for an extended client.
///
/// Built once when the client is set up and read-only afterwards. Each client
/// keeps its own clone, so two clients never share a mutable configuration.
///
/// Can be loaded from TOML:
///
/// ```toml
/// payload_support_enabled = true
/// bucket_name = "large-payloads"
/// payload_size_threshold = 262144
/// always_through_store = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffloadConfig {
    #[serde(default)]
    payload_support_enabled: bool,

    #[serde(default)]
    always_through_store: bool,

    #[serde(default = "default_payload_size_threshold")]
    payload_size_threshold: usize,

    #[serde(default)]
    bucket_name: Option<String>,
}

impl Default for OffloadConfig {
    fn default() -> Self {
        Self {
            payload_support_enabled: false,
            always_through_store: false,
            payload_size_threshold: default_payload_size_threshold(),
            bucket_name: None,
        }
    }
}

fn default_payload_size_threshold() -> usize {
    DEFAULT_PAYLOAD_SIZE_THRESHOLD
}

impl OffloadConfig {
    /// Payload support disabled, default threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, OffloadError> {
        let config: Self =
            toml::from_str(s).map_err(|e| OffloadError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Enable offloading to the given bucket.
    #[must_use]
    pub fn with_payload_support_enabled(mut self, bucket_name: impl Into<String>) -> Self {
        self.payload_support_enabled = true;
        self.bucket_name = Some(bucket_name.into());
        self
    }

    /// Disable offloading entirely, including `always_through_store`.
    #[must_use]
    pub fn with_payload_support_disabled(mut self) -> Self {
        self.payload_support_enabled = false;
        self.always_through_store = false;
        self.bucket_name = None;
        self
    }

    /// Offload every non-empty body regardless of its size.
    #[must_use]
    pub fn with_always_through_store(mut self, always: bool) -> Self {
        self.always_through_store = always;
        self
    }

    /// Set the offload threshold in bytes.
    #[must_use]
    pub fn with_payload_size_threshold(mut self, threshold: usize) -> Self {
        self.payload_size_threshold = threshold;
        self
    }

    pub fn payload_support_enabled(&self) -> bool {
        self.payload_support_enabled
    }

    pub fn always_through_store(&self) -> bool {
        self.always_through_store
    }

    pub fn payload_size_threshold(&self) -> usize {
        self.payload_size_threshold
    }

    /// Bucket (storage container) that offloaded bodies are written to.
    pub fn bucket_name(&self) -> Option<&str> {
        self.bucket_name.as_deref()
    }

    /// Check that offloading, if it can happen, has somewhere to go.
    pub fn validate(&self) -> Result<(), OffloadError> {
        let offload_possible = self.payload_support_enabled || self.always_through_store;
        let has_bucket = self.bucket_name.as_deref().is_some_and(|b| !b.is_empty());
        if offload_possible && !has_bucket {
            return Err(OffloadError::Configuration(
                "payload support requires a non-empty bucket name".to_owned(),
            ));
        }
        Ok(())
    }
}
