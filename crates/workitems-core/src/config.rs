//! Manager configuration
//!
//! Loaded from TOML or built in code:
//!
//! ```toml
//! actor = "svc-tracker"
//! provider_timeout_ms = 2000
//!
//! [value_cache]
//! max_capacity = 500
//! ttl_secs = 30
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Work item manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkItemsConfig {
    /// Actor recorded on log entries
    pub actor: String,
    /// Log entry type appended by updates
    pub update_log_entry_type: String,
    /// Identifier of unpersisted templates
    pub new_item_id: String,
    /// Limit for every collaborator call, unlimited when unset
    pub provider_timeout_ms: Option<u64>,
    /// Caching of externally resolved value lists
    pub value_cache: ValueCacheConfig,
}

impl WorkItemsConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With actor identifier
    #[inline]
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// With collaborator timeout
    #[inline]
    #[must_use]
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// With value cache settings
    #[inline]
    #[must_use]
    pub fn with_value_cache(mut self, value_cache: ValueCacheConfig) -> Self {
        self.value_cache = value_cache;
        self
    }

    /// Collaborator timeout as a duration
    #[inline]
    #[must_use]
    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout_ms.map(Duration::from_millis)
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` if the text is not valid configuration
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` if its content is not valid configuration
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&text)
    }
}

impl Default for WorkItemsConfig {
    fn default() -> Self {
        Self {
            actor: "system".to_string(),
            update_log_entry_type: "Comment".to_string(),
            new_item_id: "NEW".to_string(),
            provider_timeout_ms: None,
            value_cache: ValueCacheConfig::default(),
        }
    }
}

/// Value list cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueCacheConfig {
    /// Whether resolved lists are cached
    pub enabled: bool,
    /// Maximum cached lists
    pub max_capacity: u64,
    /// Time to live in seconds
    pub ttl_secs: u64,
}

impl ValueCacheConfig {
    /// Caching turned off
    #[inline]
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Time to live as a duration
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for ValueCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_capacity: 1_000,
            ttl_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WorkItemsConfig::new();
        assert_eq!(config.actor, "system");
        assert_eq!(config.update_log_entry_type, "Comment");
        assert_eq!(config.new_item_id, "NEW");
        assert!(config.provider_timeout().is_none());
        assert!(config.value_cache.enabled);
    }

    #[test]
    fn parse_partial_toml() {
        let config = WorkItemsConfig::from_toml_str(
            r#"
            actor = "svc"
            provider_timeout_ms = 250

            [value_cache]
            ttl_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.actor, "svc");
        assert_eq!(config.update_log_entry_type, "Comment");
        assert_eq!(config.provider_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.value_cache.ttl(), Duration::from_secs(5));
        assert_eq!(config.value_cache.max_capacity, 1_000);
    }

    #[test]
    fn parse_rejects_wrong_types() {
        let result = WorkItemsConfig::from_toml_str("provider_timeout_ms = \"soon\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let result = WorkItemsConfig::from_path("/definitely/not/here.toml").await;
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn builder_setters() {
        let config = WorkItemsConfig::new()
            .with_actor("alice")
            .with_provider_timeout(Duration::from_secs(2))
            .with_value_cache(ValueCacheConfig::disabled());

        assert_eq!(config.actor, "alice");
        assert_eq!(config.provider_timeout_ms, Some(2_000));
        assert!(!config.value_cache.enabled);
    }
}
