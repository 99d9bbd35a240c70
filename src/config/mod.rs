//! Configuration management for the voice bridge
//!
//! Configuration comes from an optional TOML file overlaid with environment
//! variables. The camera keyword table is part of the configuration so that
//! its priority order is explicit and reviewable.

use crate::camera::{CameraKeyword, CameraMapping};
use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fmt, time::Duration};
use url::Url;

/// Allowed range for the action-generation deadline
const ACTION_TIMEOUT_RANGE: std::ops::RangeInclusive<Duration> =
    Duration::from_secs(15)..=Duration::from_secs(30);

/// Bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Home Assistant connection
    pub home_assistant: HomeAssistantConfig,

    /// Ollama connection
    pub ollama: OllamaConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Ordered camera keyword table; built-in table when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cameras: Option<Vec<CameraKeyword>>,
}

/// Home Assistant configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeAssistantConfig {
    /// Base URL (e.g., "http://192.168.0.81:8123")
    pub url: Url,

    /// Long-lived access token
    #[serde(skip_serializing)]
    pub token: String,

    /// Deadline for state reads
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Deadline for a single service call
    #[serde(with = "humantime_serde")]
    pub service_timeout: Duration,

    /// Deadline for the camera snapshot probe
    #[serde(with = "humantime_serde")]
    pub snapshot_timeout: Duration,
}

impl fmt::Debug for HomeAssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HomeAssistantConfig")
            .field("url", &self.url.as_str())
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("request_timeout", &self.request_timeout)
            .field("service_timeout", &self.service_timeout)
            .field("snapshot_timeout", &self.snapshot_timeout)
            .finish()
    }
}

/// Ollama configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Base URL (e.g., "http://localhost:11434")
    pub url: Url,

    /// Model used for both action plans and status answers
    pub model: String,

    /// Deadline for action-plan generation
    #[serde(with = "humantime_serde")]
    pub action_timeout: Duration,

    /// Deadline for status-query answers
    #[serde(with = "humantime_serde")]
    pub query_timeout: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level / filter directive
    pub level: String,

    /// Optional log file (rotated daily)
    pub file: Option<PathBuf>,

    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for HomeAssistantConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:8123").expect("static URL is valid"),
            token: String::new(),
            request_timeout: Duration::from_secs(10),
            service_timeout: Duration::from_secs(10),
            snapshot_timeout: Duration::from_secs(5),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:11434").expect("static URL is valid"),
            model: "dolphin-llama3:latest".to_string(),
            action_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json: false,
        }
    }
}

impl BridgeConfig {
    /// Load configuration: file (if any), then environment, then validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            BridgeError::config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env()
    }

    /// Overlay environment variables onto this configuration
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(url) = env::var("HA_URL") {
            self.home_assistant.url = url
                .parse()
                .map_err(|e| BridgeError::config(format!("Invalid HA_URL: {}", e)))?;
        }

        if let Ok(token) = env::var("HA_TOKEN") {
            self.home_assistant.token = token;
        }

        if let Ok(timeout) = env::var("HA_TIMEOUT") {
            let secs = timeout
                .parse()
                .map_err(|e| BridgeError::config(format!("Invalid HA_TIMEOUT: {}", e)))?;
            self.home_assistant.request_timeout = Duration::from_secs(secs);
            self.home_assistant.service_timeout = Duration::from_secs(secs);
        }

        if let Ok(url) = env::var("OLLAMA_URL") {
            self.ollama.url = url
                .parse()
                .map_err(|e| BridgeError::config(format!("Invalid OLLAMA_URL: {}", e)))?;
        }

        if let Ok(model) = env::var("OLLAMA_MODEL") {
            self.ollama.model = model;
        }

        if let Ok(timeout) = env::var("OLLAMA_TIMEOUT") {
            let secs = timeout
                .parse()
                .map_err(|e| BridgeError::config(format!("Invalid OLLAMA_TIMEOUT: {}", e)))?;
            self.ollama.action_timeout = Duration::from_secs(secs);
            self.ollama.query_timeout = Duration::from_secs(secs);
        }

        if let Ok(level) = env::var("RUST_LOG") {
            self.logging.level = level;
        }

        if let Ok(file) = env::var("BRIDGE_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }

        if let Ok(json) = env::var("BRIDGE_LOG_JSON") {
            self.logging.json = matches!(json.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("Home Assistant", &self.home_assistant.url),
            ("Ollama", &self.ollama.url),
        ] {
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(BridgeError::config(format!(
                    "{name} URL must use http or https scheme"
                )));
            }
        }

        if self.ollama.model.trim().is_empty() {
            return Err(BridgeError::config("Ollama model cannot be empty"));
        }

        if !ACTION_TIMEOUT_RANGE.contains(&self.ollama.action_timeout) {
            return Err(BridgeError::config(format!(
                "Ollama action timeout must be between 15s and 30s, got {:?}",
                self.ollama.action_timeout
            )));
        }

        if self.home_assistant.service_timeout.is_zero()
            || self.home_assistant.request_timeout.is_zero()
        {
            return Err(BridgeError::config("Home Assistant timeouts must be non-zero"));
        }

        self.camera_mapping()?;
        Ok(())
    }

    /// Build the camera keyword table
    pub fn camera_mapping(&self) -> Result<CameraMapping> {
        match &self.cameras {
            Some(entries) => CameraMapping::new(entries.clone()),
            None => Ok(CameraMapping::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ollama.model, "dolphin-llama3:latest");
        assert_eq!(config.home_assistant.service_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_action_timeout_bounds() {
        let mut config = BridgeConfig::default();
        config.ollama.action_timeout = Duration::from_secs(5);
        assert!(config.validate().is_err());

        config.ollama.action_timeout = Duration::from_secs(15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_token_is_redacted_and_not_serialized() {
        let mut config = BridgeConfig::default();
        config.home_assistant.token = "secret-token".to_string();

        let debug = format!("{:?}", config.home_assistant);
        assert!(!debug.contains("secret-token"));

        let serialized = toml::to_string(&config).unwrap();
        assert!(!serialized.contains("secret-token"));
    }

    #[test]
    fn test_toml_camera_table_keeps_order() {
        let config: BridgeConfig = toml::from_str(
            r#"
            [ollama]
            model = "llama3:8b"
            action_timeout = "20s"

            [[cameras]]
            keyword = "shed"
            entity_id = "camera.shed"
            friendly_name = "Shed Camera"

            [[cameras]]
            keyword = "garden shed"
            entity_id = "camera.garden"
            friendly_name = "Garden Camera"
            "#,
        )
        .unwrap();

        assert_eq!(config.ollama.model, "llama3:8b");
        assert_eq!(config.ollama.action_timeout, Duration::from_secs(20));

        let mapping = config.camera_mapping().unwrap();
        assert_eq!(mapping.entries()[0].keyword, "shed");
        assert_eq!(
            mapping.resolve("show the garden shed").unwrap().entity_id,
            "camera.shed"
        );
    }
}
