//! Configuration management for Staffroom
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, StaffroomError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for Staffroom
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Assistant server connection settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Terminal rendering settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Assistant server configuration
///
/// The server exposes one chat endpoint and one document upload endpoint.
/// Both paths are relative to `base_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the assistant server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the chat endpoint
    #[serde(default = "default_chat_path")]
    pub chat_path: String,

    /// Path of the document upload endpoint
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// Optional request timeout in seconds
    ///
    /// Requests run to completion or failure when unset.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_chat_path() -> String {
    "/api/chat".to_string()
}

fn default_upload_path() -> String {
    "/api/upload-document".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_path: default_chat_path(),
            upload_path: default_upload_path(),
            timeout_seconds: None,
        }
    }
}

impl ServerConfig {
    /// Full URL of the chat endpoint
    ///
    /// # Examples
    ///
    /// ```
    /// use staffroom::config::ServerConfig;
    ///
    /// let server = ServerConfig {
    ///     base_url: "http://localhost:8000/".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(server.chat_url(), "http://localhost:8000/api/chat");
    /// ```
    pub fn chat_url(&self) -> String {
        join_url(&self.base_url, &self.chat_path)
    }

    /// Full URL of the document upload endpoint
    pub fn upload_url(&self) -> String {
        join_url(&self.base_url, &self.upload_path)
    }

    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Terminal rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Prefix rendered messages with their local time
    #[serde(default = "default_show_timestamps")]
    pub show_timestamps: bool,

    /// Number of input lines kept in the line editor history
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_show_timestamps() -> bool {
    true
}

fn default_history_size() -> usize {
    100
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: default_show_timestamps(),
            history_size: default_history_size(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StaffroomError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML document
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the document is not valid YAML or
    /// does not match the configuration schema
    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| StaffroomError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("STAFFROOM_SERVER_URL") {
            tracing::debug!(base_url = %base_url, "Env override: STAFFROOM_SERVER_URL");
            self.server.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("STAFFROOM_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => {
                    self.server.timeout_seconds = Some(v);
                    tracing::debug!(timeout_seconds = v, "Env override: STAFFROOM_TIMEOUT_SECONDS");
                }
                Err(_) => {
                    tracing::warn!("Invalid STAFFROOM_TIMEOUT_SECONDS: {}", timeout);
                }
            }
        }

        if let Ok(show) = std::env::var("STAFFROOM_SHOW_TIMESTAMPS") {
            match show.parse::<bool>() {
                Ok(v) => {
                    self.ui.show_timestamps = v;
                    tracing::debug!(show_timestamps = v, "Env override: STAFFROOM_SHOW_TIMESTAMPS");
                }
                Err(_) => {
                    tracing::warn!("Invalid STAFFROOM_SHOW_TIMESTAMPS: {}", show);
                }
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(server) = &cli.server {
            tracing::debug!("Using server override from CLI: {}", server);
            self.server.base_url = server.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the server URL, endpoint paths, timeout or history
    /// size are unusable
    pub fn validate(&self) -> Result<()> {
        if self.server.base_url.trim().is_empty() {
            return Err(
                StaffroomError::Config("server.base_url cannot be empty".to_string()).into(),
            );
        }

        let parsed = url::Url::parse(&self.server.base_url).map_err(|e| {
            StaffroomError::Config(format!(
                "Invalid server.base_url {}: {}",
                self.server.base_url, e
            ))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StaffroomError::Config(format!(
                "Invalid server.base_url scheme: {}. Must be one of: http, https",
                parsed.scheme()
            ))
            .into());
        }

        for (name, path) in [
            ("server.chat_path", &self.server.chat_path),
            ("server.upload_path", &self.server.upload_path),
        ] {
            if !path.starts_with('/') {
                return Err(
                    StaffroomError::Config(format!("{} must start with '/': {}", name, path))
                        .into(),
                );
            }
        }

        if self.server.timeout_seconds == Some(0) {
            return Err(StaffroomError::Config(
                "server.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.ui.history_size == 0 {
            return Err(
                StaffroomError::Config("ui.history_size must be greater than 0".to_string())
                    .into(),
            );
        }

        Ok(())
    }
}
