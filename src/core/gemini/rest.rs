//! Single-turn text replies through the Gemini REST API.

use tracing::{debug, warn};

use super::messages::{Content, GenerateContentRequest, GenerateContentResponse};
use crate::config::GeminiSettings;
use crate::core::relay::{RelayError, RelayResult};

/// Ask the text model for one reply to `text` under `system_prompt`.
///
/// Returns `Ok(None)` when the response carries no text candidate. A non-2xx
/// status is logged and its body still parsed, so an error payload also
/// yields `Ok(None)`.
pub async fn generate_reply(
    client: &reqwest::Client,
    settings: &GeminiSettings,
    system_prompt: &str,
    text: &str,
) -> RelayResult<Option<String>> {
    let api_key = settings
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(RelayError::MissingApiKey)?;

    let model = settings
        .text_model
        .strip_prefix("models/")
        .unwrap_or(&settings.text_model);
    let url = format!(
        "{}/models/{}:generateContent",
        settings.rest_url.trim_end_matches('/'),
        model
    );

    let request = GenerateContentRequest {
        system_instruction: Content::text(system_prompt),
        contents: vec![Content::user_text(text)],
    };

    debug!(model = %model, "Requesting Gemini text reply");

    let response = client
        .post(&url)
        .query(&[("key", api_key)])
        .json(&request)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                RelayError::Timeout(e.without_url().to_string())
            } else {
                RelayError::ConnectionFailed(e.without_url().to_string())
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        warn!(status = %status, model = %model, "Gemini text request returned an error status");
    }

    let body: GenerateContentResponse = response
        .json()
        .await
        .map_err(|e| RelayError::Serialization(e.without_url().to_string()))?;

    Ok(body.first_text().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> GeminiSettings {
        let mut settings = GeminiSettings::default();
        settings.api_key = Some("test-key".to_string());
        settings.rest_url = server.uri();
        settings
    }

    #[tokio::test]
    async fn test_generate_reply_returns_first_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [{ "text": "be brief" }] },
                "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "Hi, I am Solanacy." }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = generate_reply(&reqwest::Client::new(), &settings(&server), "be brief", "hello")
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("Hi, I am Solanacy."));
    }

    #[tokio::test]
    async fn test_generate_reply_error_status_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "API key not valid" }
            })))
            .mount(&server)
            .await;

        let reply = generate_reply(&reqwest::Client::new(), &settings(&server), "p", "hello")
            .await
            .unwrap();
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_generate_reply_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = generate_reply(&reqwest::Client::new(), &settings(&server), "p", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_generate_reply_requires_key() {
        let settings = GeminiSettings::default();
        let err = generate_reply(&reqwest::Client::new(), &settings, "p", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_generate_reply_accepts_prefixed_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-custom:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let mut settings = settings(&server);
        settings.text_model = "models/gemini-custom".to_string();
        let reply = generate_reply(&reqwest::Client::new(), &settings, "p", "hello")
            .await
            .unwrap();
        assert!(reply.is_none());
    }
}
