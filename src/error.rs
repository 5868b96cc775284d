//! Error taxonomy for the relay.
//!
//! Every failure of `/analyze` is a [`RelayError`]; the HTTP layer turns it
//! into a status code plus a `{ "error": string }` body.

use crate::models::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

pub const MISSING_INPUT_MESSAGE: &str = "請求中缺少需要分析的文字 (text)。";
pub const INVALID_SHAPE_MESSAGE: &str = "AI 未能生成有效的分析結果。";
pub const INTERNAL_ERROR_MESSAGE: &str = "伺服器在處理請求時發生內部錯誤。";
pub const BODY_TOO_LARGE_MESSAGE: &str = "請求內容過大，無法處理。";
pub const BODY_UNREADABLE_MESSAGE: &str = "無法讀取請求內容。";

#[derive(Debug, Error)]
pub enum RelayError {
    /// The request carried no text to analyze.
    #[error("request is missing the text to analyze")]
    MissingInput,

    /// The request body could not be buffered (too large, aborted stream).
    #[error("request body rejected with status {status}")]
    BodyRejected { status: u16 },

    /// The upstream service answered with a non-success status.
    #[error("upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The upstream answered 2xx but without candidates/content/parts/text.
    #[error("upstream response has no usable candidate text")]
    InvalidUpstreamShape,

    /// The candidate text was not valid JSON.
    #[error("candidate text is not valid JSON: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The upstream could not be reached.
    #[error("failed to reach upstream: {0}")]
    TransportFailure(String),
}

impl RelayError {
    /// HTTP status returned to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingInput => StatusCode::BAD_REQUEST,
            RelayError::BodyRejected { status } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            RelayError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            RelayError::InvalidUpstreamShape
            | RelayError::MalformedPayload(_)
            | RelayError::TransportFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable message placed in the `error` field.
    pub fn client_message(&self) -> String {
        match self {
            RelayError::MissingInput => MISSING_INPUT_MESSAGE.to_string(),
            RelayError::BodyRejected { status } if *status == 413 => {
                BODY_TOO_LARGE_MESSAGE.to_string()
            }
            RelayError::BodyRejected { .. } => BODY_UNREADABLE_MESSAGE.to_string(),
            RelayError::Upstream { body, .. } => format!("AI 伺服器錯誤: {}", body),
            RelayError::InvalidUpstreamShape => INVALID_SHAPE_MESSAGE.to_string(),
            RelayError::MalformedPayload(_) | RelayError::TransportFailure(_) => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.client_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
