//! Data models for the fact-check relay.
//!
//! This module contains the request and result types that flow through
//! the `/analyze` endpoint, plus the typed view of a single finding.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Marker the model is instructed to use when no verifiable source exists.
pub const SOURCE_NOT_APPLICABLE: &str = "N/A";

/// Verdict label attached to a finding.
///
/// The serialized form is the exact zh-TW literal the upstream model is
/// constrained to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingStatus {
    /// The claim matches reliable public information.
    #[serde(rename = "已證實")]
    Confirmed,
    /// The claim contradicts reliable public information.
    #[serde(rename = "與事實不符")]
    Contradicted,
    /// Multiple viewpoints exist without overwhelming evidence either way.
    #[serde(rename = "有爭議")]
    Disputed,
    /// No reliable public information was found.
    #[serde(rename = "無法查證")]
    Unverifiable,
    /// Absurd, satirical or illogical text that is not fact-checked.
    #[serde(rename = "邏輯不符")]
    LogicallyInvalid,
}

impl FindingStatus {
    /// All labels, in the order they appear in the response schema.
    pub const ALL: [FindingStatus; 5] = [
        FindingStatus::Confirmed,
        FindingStatus::Contradicted,
        FindingStatus::Disputed,
        FindingStatus::Unverifiable,
        FindingStatus::LogicallyInvalid,
    ];

    /// Returns the wire label.
    pub fn label(&self) -> &'static str {
        match self {
            FindingStatus::Confirmed => "已證實",
            FindingStatus::Contradicted => "與事實不符",
            FindingStatus::Disputed => "有爭議",
            FindingStatus::Unverifiable => "無法查證",
            FindingStatus::LogicallyInvalid => "邏輯不符",
        }
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Incoming body of `POST /analyze`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisRequest {
    /// Free-form text to fact-check.
    #[serde(default)]
    pub text: Option<String>,
}

impl AnalysisRequest {
    /// Returns the text if present and non-empty.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

/// One fact-checked claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub claim: String,
    pub status: FindingStatus,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Finding {
    /// Returns the source URL, treating the `N/A` marker as absent.
    pub fn source_url(&self) -> Option<&str> {
        self.source
            .as_deref()
            .filter(|s| !s.is_empty() && *s != SOURCE_NOT_APPLICABLE)
    }
}

/// Parsed payload produced by the upstream model.
///
/// Held as raw JSON so the caller receives exactly what the model returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(pub Value);

impl AnalysisResult {
    /// Typed view of the findings array.
    ///
    /// Entries that do not match the finding shape are skipped.
    pub fn findings(&self) -> Vec<Finding> {
        self.0
            .get("findings")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of entries in the findings array, regardless of shape.
    pub fn finding_count(&self) -> usize {
        self.0
            .get("findings")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// Uniform error body returned by the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
