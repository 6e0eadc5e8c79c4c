//! Indexer configuration.
//!
//! Provides configuration options for the replay binary and the token
//! metadata collaborator.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default decimals used when a token lookup fails.
pub const DEFAULT_FALLBACK_DECIMALS: u8 = 18;

/// Largest decimals value accepted as a fallback.
pub const MAX_FALLBACK_DECIMALS: u8 = 77;

/// Configuration for the indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Newline-delimited JSON file of chain events, in canonical order.
    pub events_path: Option<PathBuf>,

    /// JSON object mapping token addresses to decimals.
    pub token_metadata_path: Option<PathBuf>,

    /// Where to write the store snapshot after replay.
    pub snapshot_path: Option<PathBuf>,

    /// Decimals substituted when a token lookup fails.
    pub fallback_decimals: u8,

    /// Whether successful token lookups are memoised.
    pub token_cache_enabled: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            events_path: None,
            token_metadata_path: None,
            snapshot_path: None,
            fallback_decimals: DEFAULT_FALLBACK_DECIMALS,
            token_cache_enabled: true,
        }
    }
}

impl IndexerConfig {
    /// Creates a new configuration reading events from the given path.
    #[must_use]
    pub fn with_events_path(path: impl Into<PathBuf>) -> Self {
        Self {
            events_path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Sets the token metadata file.
    #[must_use]
    pub fn with_token_metadata_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_metadata_path = Some(path.into());
        self
    }

    /// Sets the snapshot output file.
    #[must_use]
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Sets the fallback decimals.
    #[must_use]
    pub fn with_fallback_decimals(mut self, decimals: u8) -> Self {
        self.fallback_decimals = decimals;
        self
    }

    /// Enables or disables the token lookup cache.
    #[must_use]
    pub fn with_token_cache(mut self, enabled: bool) -> Self {
        self.token_cache_enabled = enabled;
        self
    }

    /// Returns the configured event source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEventsPath`] if no source is set.
    pub fn events_source(&self) -> crate::error::Result<&Path> {
        self.events_path
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEventsPath.into())
    }

    /// Loads configuration from environment variables.
    ///
    /// Unset variables keep their defaults. Recognised keys:
    /// `EVENTS_PATH`, `TOKEN_METADATA_PATH`, `SNAPSHOT_PATH`,
    /// `DECIMALS_FALLBACK`, `TOKEN_CACHE_ENABLED`.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed,
    /// or if the resulting configuration is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            events_path: env::var("EVENTS_PATH").ok().map(PathBuf::from),
            token_metadata_path: env::var("TOKEN_METADATA_PATH").ok().map(PathBuf::from),
            snapshot_path: env::var("SNAPSHOT_PATH").ok().map(PathBuf::from),
            ..Default::default()
        };

        if let Ok(raw) = env::var("DECIMALS_FALLBACK") {
            config.fallback_decimals = raw
                .parse()
                .map_err(|_| ConfigError::InvalidVariable("DECIMALS_FALLBACK", raw))?;
        }

        if let Ok(raw) = env::var("TOKEN_CACHE_ENABLED") {
            config.token_cache_enabled = parse_bool(&raw)
                .ok_or(ConfigError::InvalidVariable("TOKEN_CACHE_ENABLED", raw))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.events_path.is_none() {
            return Err(ConfigError::MissingEventsPath);
        }

        if self.fallback_decimals > MAX_FALLBACK_DECIMALS {
            return Err(ConfigError::InvalidFallbackDecimals(self.fallback_decimals));
        }

        Ok(())
    }
}

/// Accepts `true`/`false`/`1`/`0`, case-insensitive.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// No event source configured.
    #[error("events_path must be set")]
    MissingEventsPath,

    /// Fallback decimals out of range.
    #[error("fallback_decimals must be <= 77, got {0}")]
    InvalidFallbackDecimals(u8),

    /// Environment variable holds an unparseable value.
    #[error("invalid value for {0}: {1:?}")]
    InvalidVariable(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_source() {
        let config = IndexerConfig::with_events_path("/data/events.ndjson");
        let path = config.events_source().expect("path");
        assert_eq!(path, Path::new("/data/events.ndjson"));
    }

    #[test]
    fn test_events_source_missing() {
        let config = IndexerConfig::default();
        let result = config.events_source();
        assert!(matches!(
            result,
            Err(crate::error::IndexerError::Config(ConfigError::MissingEventsPath))
        ));
    }

    #[test]
    fn test_config_default() {
        let config = IndexerConfig::default();
        assert!(config.events_path.is_none());
        assert!(config.token_metadata_path.is_none());
        assert!(config.snapshot_path.is_none());
        assert_eq!(config.fallback_decimals, 18);
        assert!(config.token_cache_enabled);
    }

    #[test]
    fn test_config_builder() {
        let config = IndexerConfig::with_events_path("events.ndjson")
            .with_token_metadata_path("tokens.json")
            .with_snapshot_path("snapshot.json")
            .with_fallback_decimals(6)
            .with_token_cache(false);

        assert_eq!(config.events_path, Some(PathBuf::from("events.ndjson")));
        assert_eq!(config.token_metadata_path, Some(PathBuf::from("tokens.json")));
        assert_eq!(config.snapshot_path, Some(PathBuf::from("snapshot.json")));
        assert_eq!(config.fallback_decimals, 6);
        assert!(!config.token_cache_enabled);
    }

    #[test]
    fn test_config_validate_valid() {
        let config = IndexerConfig::with_events_path("events.ndjson");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_missing_events_path() {
        let config = IndexerConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEventsPath)
        ));
    }

    #[test]
    fn test_config_validate_invalid_fallback() {
        let config = IndexerConfig::with_events_path("events.ndjson").with_fallback_decimals(78);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFallbackDecimals(78))
        ));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_config_serde() {
        let config = IndexerConfig::with_events_path("events.ndjson");
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed: IndexerConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.events_path, config.events_path);
        assert_eq!(parsed.fallback_decimals, config.fallback_decimals);
    }
}
