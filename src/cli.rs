//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// factcheck-relay - fact-check free-form text through Gemini
///
/// Serves `POST /analyze`, forwarding the submitted text to the Gemini
/// generateContent API and returning structured findings.
///
/// Examples:
///   factcheck-relay --api-key $GEMINI_API_KEY
///   factcheck-relay --port 8080 --timeout 60
///   factcheck-relay --config ./relay.toml --verbose
///   factcheck-relay --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Port to listen on [default: 3000]
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Host to bind to [default: 0.0.0.0]
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Gemini model to use [default: gemini-2.0-flash]
    #[arg(short, long, env = "GEMINI_MODEL")]
    pub model: Option<String>,

    /// Base URL of the Generative Language API
    #[arg(long, value_name = "URL", env = "GEMINI_API_BASE")]
    pub api_base: Option<String>,

    /// Upstream request timeout in seconds
    ///
    /// Without this flag the HTTP client's default applies.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .factcheck.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .factcheck.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if let Some(ref api_base) = self.api_base {
            if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
                return Err("API base must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref config_path) = self.config {
            if !config_path.is_file() {
                return Err(format!(
                    "Config file does not exist: {}",
                    config_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
