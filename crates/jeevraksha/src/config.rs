//! Configuration management for jeevraksha.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::summary::gemini::DEFAULT_API_BASE;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "jeevraksha";

/// Default namespaced key for the profile list.
const DEFAULT_STORAGE_KEY: &str = "jeevraksha_profiles";

/// Environment variables accepted as the summary API key.
const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `JEEVRAKSHA_`, `__` between levels)
/// 2. TOML config file at `~/.config/jeevraksha/config.toml`
/// 3. `GEMINI_API_KEY` / `API_KEY` for `summary.api_key`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Summary generation configuration.
    pub summary: SummaryConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the profile blob.
    /// Defaults to `~/.local/share/jeevraksha`
    pub data_dir: Option<PathBuf>,
    /// Namespaced key the profile list is stored under.
    pub storage_key: String,
}

/// Summary-related configuration.
///
/// Model and sampling parameters are fixed; only the connection is configurable.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// API key for the text-generation service.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL of the text-generation service.
    pub api_base: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Will be resolved to default at runtime
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        // Bare API key variables sit below the config file; prefixed ones win.
        let api_key_env = Env::raw()
            .only(&API_KEY_ENV_VARS)
            .map(|_| "summary.api_key".into());

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(api_key_env)
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("JEEVRAKSHA_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let key = &self.storage.storage_key;
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::ConfigValidation {
                message: format!(
                    "storage_key must be non-empty and contain only letters, digits, '_' or '-' (got '{key}')"
                ),
            });
        }

        if self.summary.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "timeout_secs must be greater than 0".to_string(),
            });
        }

        let base = &self.summary.api_base;
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            return Err(Error::ConfigValidation {
                message: format!("api_base must be an http(s) URL (got '{base}')"),
            });
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the path of the profile blob.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir()
            .join(format!("{}.json", self.storage.storage_key))
    }

    /// Get the summary request timeout as a Duration.
    #[must_use]
    pub fn summary_timeout(&self) -> Duration {
        Duration::from_secs(self.summary.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.data_dir.is_none());
        assert_eq!(config.storage.storage_key, "jeevraksha_profiles");
        assert!(config.summary.api_key.is_none());
        assert_eq!(config.summary.api_base, DEFAULT_API_BASE);
        assert_eq!(config.summary.timeout_secs, 30);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_storage_key() {
        let mut config = Config::default();
        config.storage.storage_key = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("storage_key"));
    }

    #[test]
    fn test_validate_storage_key_with_path_separator() {
        let mut config = Config::default();
        config.storage.storage_key = "../escape".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.summary.timeout_secs = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("timeout_secs"));
    }

    #[test]
    fn test_validate_bad_api_base() {
        let mut config = Config::default();
        config.summary.api_base = "ftp://example.com".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("api_base"));
    }

    #[test]
    fn test_storage_path_default() {
        let config = Config::default();
        let path = config.storage_path();

        assert!(path.to_string_lossy().contains("jeevraksha"));
        assert!(path.ends_with("jeevraksha_profiles.json"));
    }

    #[test]
    fn test_storage_path_custom() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/custom/dir"));
        config.storage.storage_key = "family".to_string();

        assert_eq!(
            config.storage_path(),
            PathBuf::from("/custom/dir/family.json")
        );
    }

    #[test]
    fn test_summary_timeout() {
        assert_eq!(Config::default().summary_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut config = Config::default();
        config.summary.api_key = Some("secret-key-value".to_string());

        let debug_str = format!("{config:?}");
        assert!(!debug_str.contains("secret-key-value"));
        assert!(debug_str.contains("<redacted>"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("jeevraksha"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    fn load_in_jail(path: &str) -> figment::error::Result<Config> {
        Config::load_from(Some(PathBuf::from(path))).map_err(|e| e.to_string().into())
    }

    #[test]
    fn test_load_from_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[storage]\nstorage_key = \"family\"\n\n[summary]\ntimeout_secs = 5\n",
            )?;

            let config = load_in_jail("config.toml")?;
            assert_eq!(config.storage.storage_key, "family");
            assert_eq!(config.summary.timeout_secs, 5);
            Ok(())
        });
    }

    #[test]
    fn test_load_invalid_toml_value_fails_validation() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[summary]\ntimeout_secs = 0\n")?;
            assert!(Config::load_from(Some(PathBuf::from("config.toml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_bare_api_key_env_fills_summary_key() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GEMINI_API_KEY", "from-env");

            let config = load_in_jail("missing.toml")?;
            assert_eq!(config.summary.api_key.as_deref(), Some("from-env"));
            Ok(())
        });
    }

    #[test]
    fn test_alternate_api_key_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("API_KEY", "from-api-key");

            let config = load_in_jail("missing.toml")?;
            assert_eq!(config.summary.api_key.as_deref(), Some("from-api-key"));
            Ok(())
        });
    }

    #[test]
    fn test_toml_api_key_beats_bare_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GEMINI_API_KEY", "from-env");
            jail.create_file("config.toml", "[summary]\napi_key = \"from-toml\"\n")?;

            let config = load_in_jail("config.toml")?;
            assert_eq!(config.summary.api_key.as_deref(), Some("from-toml"));
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_beats_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[summary]\ntimeout_secs = 5\n")?;
            jail.set_env("JEEVRAKSHA_SUMMARY__TIMEOUT_SECS", "7");
            jail.set_env("JEEVRAKSHA_STORAGE__STORAGE_KEY", "elders");

            let config = load_in_jail("config.toml")?;
            assert_eq!(config.summary.timeout_secs, 7);
            assert_eq!(config.storage.storage_key, "elders");
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_zero_timeout_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("JEEVRAKSHA_SUMMARY__TIMEOUT_SECS", "0");

            let err = Config::load_from(Some(PathBuf::from("missing.toml"))).unwrap_err();
            assert!(err.to_string().contains("timeout_secs"));
            Ok(())
        });
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"storage_key": "elders"}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.storage_key, "elders");
        assert!(storage.data_dir.is_none());
    }
}
