use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::gemini::generate_reply;
use crate::core::prompt::build_system_prompt;
use crate::core::relay::RelayError;
use crate::core::session::{SessionProfile, SessionQuery};
use crate::state::AppState;

/// Body of the health endpoint.
pub const HEALTH_MESSAGE: &str = "Solanacy relay is live";

const NO_TEXT_REPLY: &str = "No text received.";
const NO_CANDIDATE_REPLY: &str = "Sorry, I could not reply.";
const SERVER_ERROR_REPLY: &str = "Server error";
const NOT_CONFIGURED_REPLY: &str = "Voice service is not configured.";

/// Health check: plain-text liveness message.
pub async fn health_check() -> &'static str {
    HEALTH_MESSAGE
}

#[derive(Debug, Default, Deserialize)]
pub struct VoiceRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoiceResponse {
    pub reply: String,
}

impl VoiceResponse {
    fn new(reply: impl Into<String>) -> Json<Self> {
        Json(Self {
            reply: reply.into(),
        })
    }
}

/// Single-turn text reply.
///
/// Every outcome is answered with a `{"reply": ...}` body; failures are
/// distinguished by status only. A body that is not a JSON object of the
/// expected shape counts as carrying no text.
pub async fn voice_handler(
    State(state): State<Arc<AppState>>,
    request: Result<Json<VoiceRequest>, JsonRejection>,
) -> (StatusCode, Json<VoiceResponse>) {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Unreadable voice request body: {}", rejection.body_text());
            VoiceRequest::default()
        }
    };

    let Some(text) = request
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        return (StatusCode::OK, VoiceResponse::new(NO_TEXT_REPLY));
    };

    let profile = SessionProfile::from_query(SessionQuery {
        session: None,
        name: request.name,
        company: request.company,
    })
    .unwrap_or_else(|_| SessionProfile::anonymous());
    let system_prompt = build_system_prompt(&profile);

    match generate_reply(&state.http_client, &state.config.gemini, &system_prompt, text).await {
        Ok(Some(reply)) => {
            info!(chars = reply.chars().count(), "Voice reply generated");
            (StatusCode::OK, VoiceResponse::new(reply))
        }
        Ok(None) => {
            warn!("Voice request produced no candidate text");
            (StatusCode::OK, VoiceResponse::new(NO_CANDIDATE_REPLY))
        }
        Err(RelayError::MissingApiKey) => {
            warn!("Voice request refused: upstream API key not configured");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                VoiceResponse::new(NOT_CONFIGURED_REPLY),
            )
        }
        Err(e) => {
            error!("Voice request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                VoiceResponse::new(SERVER_ERROR_REPLY),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::routes::create_app;
    use axum::body::Body;
    use axum::http::{Request, header};
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(rest_url: Option<&str>) -> ServerConfig {
        let mut config = ServerConfig {
            rate_limit_requests_per_second: 100_000,
            ..ServerConfig::default()
        };
        if let Some(url) = rest_url {
            config.gemini.api_key = Some("test-key".to_string());
            config.gemini.rest_url = url.to_string();
        }
        config
    }

    fn voice_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/voice")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn call(config: ServerConfig, request: Request<Body>) -> (StatusCode, VoiceResponse) {
        let app = create_app(AppState::new(config).unwrap());
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_app(AppState::new(config(None)).unwrap());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], HEALTH_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_voice_blank_text() {
        let (status, body) = call(config(None), voice_request(json!({ "text": "   " }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.reply, NO_TEXT_REPLY);

        let (status, body) = call(config(None), voice_request(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.reply, NO_TEXT_REPLY);
    }

    #[tokio::test]
    async fn test_voice_unreadable_body() {
        let plain = Request::builder()
            .method("POST")
            .uri("/voice")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap();
        let (status, body) = call(config(None), plain).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.reply, NO_TEXT_REPLY);

        let (status, body) = call(config(None), voice_request(json!({ "text": 5 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.reply, NO_TEXT_REPLY);

        let malformed = Request::builder()
            .method("POST")
            .uri("/voice")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"text\":"))
            .unwrap();
        let (status, body) = call(config(None), malformed).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.reply, NO_TEXT_REPLY);
    }

    #[tokio::test]
    async fn test_voice_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "check paracetamol stock" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "Checking paracetamol now." }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = call(
            config(Some(&server.uri())),
            voice_request(json!({ "text": "check paracetamol stock", "name": "Rahim" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.reply, "Checking paracetamol now.");

        let requests = server.received_requests().await.unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let prompt = sent["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("assisting Rahim"));
    }

    #[tokio::test]
    async fn test_voice_no_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let (status, body) = call(
            config(Some(&server.uri())),
            voice_request(json!({ "text": "hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.reply, NO_CANDIDATE_REPLY);
    }

    #[tokio::test]
    async fn test_voice_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let (status, body) = call(
            config(Some(&server.uri())),
            voice_request(json!({ "text": "hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.reply, SERVER_ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_voice_without_key() {
        let (status, body) = call(config(None), voice_request(json!({ "text": "hello" }))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.reply, NOT_CONFIGURED_REPLY);
    }
}
