//! # Client Configuration
//!
//! Where the backend lives and how to talk to it.
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults           base_url = http://localhost:8000                 │
//! │  2. balcao.toml        platform config dir, or an explicit path         │
//! │  3. Environment        BALCAO_API_URL, BALCAO_API_TOKEN,                │
//! │                        BALCAO_TIMEOUT_SECS                              │
//! │  4. validate()                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example balcao.toml
//! ```toml
//! base_url = "https://erp.example.com"
//! token = "e1f0..."
//! timeout_secs = 15
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root URL of the ERP REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Static bearer token. Login flows are handled elsewhere.
    #[serde(default)]
    pub token: Option<String>,

    /// Per-request timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading API config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load API config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ClientError::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if matches!(self.token.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(ClientError::Config("token must not be blank".into()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("BALCAO_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.base_url = url;
        }

        if let Ok(token) = std::env::var("BALCAO_API_TOKEN") {
            debug!("Overriding API token from environment");
            self.token = Some(token);
        }

        if let Ok(timeout) = std::env::var("BALCAO_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring invalid BALCAO_TIMEOUT_SECS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("br", "balcao", "balcao")
            .map(|dirs| dirs.config_dir().join("balcao.toml"))
    }

    /// `base_url` joined with a relative API path.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ApiConfig = toml::from_str(r#"token = "abc""#).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ApiConfig {
            base_url: "ftp://erp".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));

        config.base_url = "https://erp".to_string();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.timeout_secs = 5;
        config.token = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_url_join() {
        let config = ApiConfig {
            base_url: "https://erp.example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.url("/api/payment-methods/"),
            "https://erp.example.com/api/payment-methods/"
        );
    }
}
