//! Upgrade engine configuration

use std::collections::BTreeMap;
use std::path::Path;

use otelcol_api::{MANAGED_BY_LABEL, MANAGED_BY_VALUE};
use serde::{Deserialize, Serialize};

/// Default for [`UpgradeConfig::status_message_limit`]
pub const DEFAULT_STATUS_MESSAGE_LIMIT: usize = 50;

/// Upgrade engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct UpgradeConfig {
    /// Labels a resource must carry to be upgraded by the fleet-wide pass
    pub selector: BTreeMap<String, String>,
    /// Treat an unregistered recorded version as an error instead of current
    pub strict_versions: bool,
    /// Append change descriptions to `status.messages`
    pub record_status_messages: bool,
    /// Most recent messages kept in `status.messages`
    pub status_message_limit: usize,
}

impl UpgradeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With label selector
    #[inline]
    #[must_use]
    pub fn with_selector(mut self, selector: BTreeMap<String, String>) -> Self {
        self.selector = selector;
        self
    }

    /// With strict version handling
    #[inline]
    #[must_use]
    pub fn with_strict_versions(mut self, strict: bool) -> Self {
        self.strict_versions = strict;
        self
    }

    /// With status message recording
    #[inline]
    #[must_use]
    pub fn with_status_messages(mut self, record: bool) -> Self {
        self.record_status_messages = record;
        self
    }

    /// With status message limit
    #[inline]
    #[must_use]
    pub fn with_status_message_limit(mut self, limit: usize) -> Self {
        self.status_message_limit = limit;
        self
    }

    /// Load from a YAML file, or TOML when the extension is `.toml`
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "toml") {
            Ok(toml::from_str(&raw)?)
        } else {
            Ok(serde_yaml::from_str(&raw)?)
        }
    }
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            selector: BTreeMap::from([(
                MANAGED_BY_LABEL.to_string(),
                MANAGED_BY_VALUE.to_string(),
            )]),
            strict_versions: false,
            record_status_messages: true,
            status_message_limit: DEFAULT_STATUS_MESSAGE_LIMIT,
        }
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    /// File could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// YAML is invalid
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML is invalid
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
}
