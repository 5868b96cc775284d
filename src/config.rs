//! Configuration file handling.
//!
//! This module handles loading `.factcheck.toml` and merging it with
//! command-line arguments and environment variables.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".factcheck.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Gemini API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the Generative Language API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model used for generateContent.
    #[serde(default = "default_model")]
    pub model: String,

    /// API key. Usually supplied through `GEMINI_API_KEY` instead.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Request timeout in seconds. `None` keeps the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key: String::new(),
            timeout_seconds: None,
        }
    }
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.factcheck.toml` from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Values given on the command line or through the environment take
    /// precedence over the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref key) = args.api_key {
            self.upstream.api_key = key.clone();
        }
        if let Some(ref model) = args.model {
            self.upstream.model = model.clone();
        }
        if let Some(ref api_base) = args.api_base {
            self.upstream.api_base = api_base.clone();
        }
        if let Some(timeout) = args.timeout {
            self.upstream.timeout_seconds = Some(timeout);
        }
    }

    /// Check that the merged configuration can start the server.
    pub fn validate(&self) -> Result<()> {
        if self.upstream.api_key.trim().is_empty() {
            bail!("Missing Gemini API key: set GEMINI_API_KEY or pass --api-key");
        }
        if self.server.port == 0 {
            bail!("Port must be between 1 and 65535");
        }
        if !self.upstream.api_base.starts_with("http://")
            && !self.upstream.api_base.starts_with("https://")
        {
            bail!("Gemini API base must start with 'http://' or 'https://'");
        }
        if self.upstream.model.trim().is_empty() {
            bail!("Gemini model name must not be empty");
        }
        if self.upstream.timeout_seconds == Some(0) {
            bail!("Timeout must be at least 1 second");
        }
        Ok(())
    }

    /// Socket address string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
