//! HTTP surface: a single `POST /analyze` route.

use crate::error::RelayError;
use crate::models::{AnalysisRequest, AnalysisResult};
use crate::relay::AnalysisRelay;
use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: AnalysisRelay,
}

impl AppState {
    pub fn new(relay: AnalysisRelay) -> Self {
        Self { relay }
    }
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/analyze", post(analyze))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// POST /analyze - fact-check the submitted text.
async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, RelayError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return Err(rejection_error(rejection)),
    };

    let result = state.relay.analyze(&request).await?;
    Ok(Json(result))
}

/// Map a body extraction failure onto the relay's error taxonomy.
///
/// Bodies that were read but are not a `{ "text": string }` object count as
/// missing input; bodies that could not be read keep axum's status.
fn rejection_error(rejection: JsonRejection) -> RelayError {
    warn!("Rejected request body: {}", rejection.body_text());
    match rejection {
        JsonRejection::BytesRejection(_) => RelayError::BodyRejected {
            status: rejection.status().as_u16(),
        },
        _ => RelayError::MissingInput,
    }
}

/// Bind `address` and serve until Ctrl+C.
pub async fn run_server(address: &str, relay: AnalysisRelay) -> Result<()> {
    let app = create_router(AppState::new(relay));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{
        BODY_TOO_LARGE_MESSAGE, INTERNAL_ERROR_MESSAGE, INVALID_SHAPE_MESSAGE,
        MISSING_INPUT_MESSAGE,
    };
    use crate::relay::tests::{candidate_body, FakeUpstream};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(fake: Arc<FakeUpstream>) -> Router {
        create_router(AppState::new(AnalysisRelay::new(fake)))
    }

    fn post_analyze(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_missing_text_is_bad_request() {
        for body in ["{}", r#"{"text": null}"#, r#"{"text": ""}"#, "not json", r#"{"text": 5}"#] {
            let fake = FakeUpstream::replying(200, candidate_body("{}"));
            let (status, json) = send(app(fake.clone()), post_analyze(body)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(json, json!({ "error": MISSING_INPUT_MESSAGE }));
            assert_eq!(fake.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_oversized_body_is_not_missing_input() {
        let fake = FakeUpstream::replying(200, candidate_body("{}"));
        let body = json!({ "text": "a".repeat(3 * 1024 * 1024) }).to_string();

        let (status, json) = send(app(fake.clone()), post_analyze(&body)).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json, json!({ "error": BODY_TOO_LARGE_MESSAGE }));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let fake = FakeUpstream::replying(200, candidate_body("{}"));
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .body(Body::from(r#"{"text":"x"}"#))
            .unwrap();

        let (status, json) = send(app(fake.clone()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_success_passes_findings_through() {
        let inner = json!({
            "findings": [{
                "claim": "狗狗是鳥類",
                "status": "邏輯不符",
                "explanation": "此陳述不合邏輯，狗屬於哺乳類。",
                "source": "N/A"
            }]
        });
        let fake = FakeUpstream::replying(200, candidate_body(&inner.to_string()));

        let (status, json) = send(app(fake.clone()), post_analyze(r#"{"text": "狗狗是鳥類"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, inner);
        assert!(fake.prompts.lock().unwrap()[0].contains("狗狗是鳥類"));
    }

    #[tokio::test]
    async fn test_upstream_status_forwarded() {
        let fake = FakeUpstream::replying(400, r#"{"error":{"message":"API key not valid"}}"#);

        let (status, json) = send(app(fake), post_analyze(r#"{"text": "x"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = json["error"].as_str().unwrap();
        assert!(message.starts_with("AI 伺服器錯誤: "));
        assert!(message.contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_invalid_shape_is_generic_500() {
        let fake = FakeUpstream::replying(200, r#"{"candidates":[{"content":{"parts":[]}}]}"#);

        let (status, json) = send(app(fake), post_analyze(r#"{"text": "x"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": INVALID_SHAPE_MESSAGE }));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_generic_500() {
        let fake = FakeUpstream::replying(200, candidate_body("findings: none"));

        let (status, json) = send(app(fake), post_analyze(r#"{"text": "x"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": INTERNAL_ERROR_MESSAGE }));
    }

    #[tokio::test]
    async fn test_non_json_upstream_body_is_generic_500() {
        let fake = FakeUpstream::replying(200, "<html>Service Unavailable</html>");

        let (status, json) = send(app(fake), post_analyze(r#"{"text": "x"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": INTERNAL_ERROR_MESSAGE }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_generic_500() {
        let fake = FakeUpstream::failing(RelayError::TransportFailure("connection reset".into()));

        let (status, json) = send(app(fake), post_analyze(r#"{"text": "x"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": INTERNAL_ERROR_MESSAGE }));
    }

    #[tokio::test]
    async fn test_cors_preflight_allowed() {
        let fake = FakeUpstream::replying(200, candidate_body("{}"));
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/analyze")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app(fake).oneshot(request).await.unwrap();

        assert!(response.status().is_success());
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_not_found() {
        let fake = FakeUpstream::replying(200, candidate_body("{}"));
        let request = Request::builder()
            .method("POST")
            .uri("/analyse")
            .body(Body::empty())
            .unwrap();

        let response = app(fake).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
