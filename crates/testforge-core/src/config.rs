//! Configuration values injected at startup.
//!
//! Nothing below reads process-global state; the binary resolves flags and
//! environment variables and passes the values in.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Generative backend configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub api_key: String,
    pub model_name: String,
    pub endpoint: String,
    pub request_timeout: Duration,
}

// Keep the credential out of logs.
impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ModelConfig {
    /// Build a config for `api_key` with default model, endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self {
            api_key,
            model_name: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Reject values the backend cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "model".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                field: "endpoint".to_string(),
                reason: format!("not an http(s) URL: {}", self.endpoint),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "request_timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Which files under the source root count as modules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Extension without the leading dot.
    pub extension: String,

    /// Exact file names never treated as modules.
    pub excluded_names: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: "py".to_string(),
            excluded_names: vec!["__init__.py".to_string()],
        }
    }
}

/// Directory layout of one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutConfig {
    pub source_root: PathBuf,
    pub test_dir: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("src"),
            test_dir: PathBuf::from("tests"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_rejected() {
        assert!(matches!(
            ModelConfig::new("   "),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_defaults() {
        let config = ModelConfig::new("k").unwrap();
        assert_eq!(config.model_name, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(
            config.request_timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let config = ModelConfig::new("k")
            .unwrap()
            .with_endpoint("http://localhost:8080/v1/");
        assert_eq!(config.endpoint, "http://localhost:8080/v1");
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        let config = ModelConfig::new("k").unwrap();
        assert!(config.validate().is_ok());

        let err = config
            .clone()
            .with_request_timeout(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "request_timeout"));

        let err = config.clone().with_endpoint("localhost:8080").validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "endpoint"));

        let err = config.with_model(" ").validate().unwrap_err();
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ModelConfig::new("super-secret").unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_discovery_defaults() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.extension, "py");
        assert_eq!(config.excluded_names, vec!["__init__.py".to_string()]);
    }
}
