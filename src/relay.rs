//! The analysis relay.
//!
//! Validates the request, builds the prompt, calls the upstream once and
//! hands back the model's JSON untouched.

use crate::error::RelayError;
use crate::gemini::payload::GenerateContentResponse;
use crate::gemini::UpstreamClient;
use crate::models::{AnalysisRequest, AnalysisResult, SOURCE_NOT_APPLICABLE};
use crate::prompt::build_prompt;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Stateless relay shared by all requests.
#[derive(Clone)]
pub struct AnalysisRelay {
    upstream: Arc<dyn UpstreamClient>,
}

impl AnalysisRelay {
    pub fn new(upstream: Arc<dyn UpstreamClient>) -> Self {
        Self { upstream }
    }

    /// Fact-check the text carried by `request`.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, RelayError> {
        let text = request.text().ok_or(RelayError::MissingInput)?;
        debug!("Analyzing {} characters of text", text.chars().count());

        let prompt = build_prompt(text);
        let raw = self.upstream.fetch_analysis(&prompt).await.map_err(|e| {
            error!("Upstream call failed: {}", e);
            e
        })?;

        if !raw.is_success() {
            error!("Gemini API error: {} {}", raw.status, raw.body);
            return Err(RelayError::Upstream {
                status: raw.status,
                body: raw.body,
            });
        }

        let response: GenerateContentResponse =
            serde_json::from_str(&raw.body).map_err(|e| {
                error!("Gemini response is not valid JSON ({}): {}", e, raw.body);
                RelayError::MalformedPayload(e)
            })?;

        let Some(content_text) = response.first_text() else {
            error!("Gemini response has no candidate text: {}", raw.body);
            return Err(RelayError::InvalidUpstreamShape);
        };

        let content: Value = serde_json::from_str(content_text).map_err(|e| {
            error!("Candidate text is not valid JSON ({}): {}", e, content_text);
            RelayError::MalformedPayload(e)
        })?;

        let result = AnalysisResult(content);
        info!("Analysis complete with {} findings", result.finding_count());
        for finding in result.findings() {
            debug!(
                "Finding [{}] {} (source: {})",
                finding.status,
                finding.claim,
                finding.source_url().unwrap_or(SOURCE_NOT_APPLICABLE)
            );
        }

        Ok(result)
    }
}
