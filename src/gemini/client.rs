//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! The relay only depends on [`UpstreamClient`], so tests can substitute a
//! fake without touching the network.

use crate::config::UpstreamConfig;
use crate::error::RelayError;
use crate::gemini::payload::build_payload;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Status and body of an upstream reply, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl RawUpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Anything that can turn a prompt into a raw upstream reply.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn fetch_analysis(&self, prompt: &str) -> Result<RawUpstreamResponse, RelayError>;
}

/// Gemini client backed by a pooled `reqwest::Client`.
pub struct GeminiClient {
    config: UpstreamConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client from upstream settings.
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Full URL of the generateContent call.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl UpstreamClient for GeminiClient {
    async fn fetch_analysis(&self, prompt: &str) -> Result<RawUpstreamResponse, RelayError> {
        let url = self.endpoint();
        let payload = build_payload(prompt);

        debug!("Sending generateContent request to {}", url);

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RelayError::TransportFailure(format!(
                        "Request timed out after {}s",
                        self.config.timeout_seconds.unwrap_or_default()
                    ))
                } else if e.is_connect() {
                    RelayError::TransportFailure(format!(
                        "Cannot connect to Gemini at {}",
                        self.config.api_base
                    ))
                } else {
                    RelayError::TransportFailure(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RelayError::TransportFailure(format!("Failed to read response: {}", e)))?;

        debug!("Gemini responded with status {} ({} bytes)", status, body.len());

        Ok(RawUpstreamResponse { status, body })
    }
}
