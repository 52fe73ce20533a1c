//! Service configuration
//!
//! Loaded from an optional TOML file; every section and field has a default so
//! an empty file (or no file) yields a working local setup.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default nutrition API endpoint
pub const DEFAULT_NUTRITION_URL: &str = "https://my.smoothiefroot.com/api/fruit";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// HTTP surface
    pub server: ServerConfig,
    /// Backing store
    pub store: StoreConfig,
    /// External nutrition API
    pub nutrition: NutritionConfig,
}

impl ShopConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed TOML
    /// - `ConfigError::Invalid` if values fail validation
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` / `ConfigError::Invalid` as for [`Self::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without validating it, for callers that apply
    /// overrides first
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` if the TOML does not match the config shape
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// With database path
    #[inline]
    #[must_use]
    pub fn with_database(mut self, database: impl Into<PathBuf>) -> Self {
        self.store.database = database.into();
        self
    }

    /// With bind address
    #[inline]
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.server.bind = bind;
        self
    }

    /// With nutrition endpoint
    #[inline]
    #[must_use]
    pub fn with_nutrition_url(mut self, base_url: impl Into<String>) -> Self {
        self.nutrition.base_url = base_url.into();
        self
    }

    /// Check values that parse but cannot work
    ///
    /// # Errors
    /// - `ConfigError::Invalid` naming the offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.database.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.database must not be empty".into()));
        }
        if self.nutrition.enabled {
            if self.nutrition.base_url.trim().is_empty() {
                return Err(ConfigError::Invalid("nutrition.base_url must not be empty".into()));
            }
            if self.nutrition.timeout_secs == 0 {
                return Err(ConfigError::Invalid("nutrition.timeout_secs must be positive".into()));
            }
        }
        Ok(())
    }
}

/// HTTP surface configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

/// Backing store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file, or `:memory:`
    pub database: PathBuf,
}

impl StoreConfig {
    /// Whether the database lives only in memory
    #[inline]
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.database.as_os_str() == ":memory:"
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("smoothies.db"),
        }
    }
}

/// Nutrition API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionConfig {
    /// Whether lookups run at all
    pub enabled: bool,
    /// Base URL; the lookup key is appended as the last path segment
    pub base_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Maximum cached records
    pub cache_capacity: u64,
    /// Cached record lifetime
    pub cache_ttl_secs: u64,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_NUTRITION_URL.to_string(),
            timeout_secs: 5,
            cache_capacity: 256,
            cache_ttl_secs: 600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ShopConfig::from_toml_str("").unwrap();
        assert_eq!(config, ShopConfig::default());
        assert_eq!(config.nutrition.base_url, DEFAULT_NUTRITION_URL);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ShopConfig::from_toml_str(
            r#"
            [store]
            database = ":memory:"

            [nutrition]
            timeout_secs = 2
            "#,
        )
        .unwrap();

        assert!(config.store.is_in_memory());
        assert_eq!(config.nutrition.timeout_secs, 2);
        assert_eq!(config.nutrition.cache_capacity, 256);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ShopConfig::from_toml_str("[nutrition]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn disabled_nutrition_skips_endpoint_checks() {
        let config = ShopConfig::from_toml_str(
            "[nutrition]\nenabled = false\nbase_url = \"\"\ntimeout_secs = 0\n",
        )
        .unwrap();
        assert!(!config.nutrition.enabled);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = ShopConfig::from_toml_str("[server\nbind = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
