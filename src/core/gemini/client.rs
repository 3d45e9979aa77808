//! Gemini Live upstream connection.

use futures::SinkExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use super::config::GeminiLiveConfig;
use super::messages::{Content, GenerationConfig, Setup, SetupMessage, SpeechConfig, Tool};
use crate::core::prompt::build_system_prompt;
use crate::core::relay::{RelayError, RelayResult};
use crate::core::session::SessionProfile;
use crate::core::tools::tool_manifest;

/// An established upstream socket.
pub type UpstreamSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Build the setup frame for one session.
pub fn build_setup_message(config: &GeminiLiveConfig, profile: &SessionProfile) -> SetupMessage {
    SetupMessage {
        setup: Setup {
            model: config.model_resource(),
            generation_config: GenerationConfig {
                response_modalities: config.response_modalities.clone(),
                speech_config: config.voice.as_deref().map(SpeechConfig::prebuilt),
            },
            system_instruction: Content::text(build_system_prompt(profile)),
            tools: vec![Tool {
                function_declarations: tool_manifest(),
            }],
        },
    }
}

/// Open the upstream socket and send the setup frame.
///
/// The setup frame is the first frame the upstream sees on this socket; the
/// caller must not forward any client frame before this returns.
///
/// # Errors
/// * [`RelayError::Timeout`] if the handshake exceeds `connect_timeout`
/// * [`RelayError::ConnectionFailed`] if the handshake fails
/// * [`RelayError::WebSocket`] if the setup frame cannot be sent
pub async fn connect_upstream(
    config: &GeminiLiveConfig,
    setup: &SetupMessage,
) -> RelayResult<UpstreamSocket> {
    let url = config.endpoint_url()?;
    let payload =
        serde_json::to_string(setup).map_err(|e| RelayError::Serialization(e.to_string()))?;

    debug!(endpoint = %config.url, model = %config.model, "Connecting to Gemini Live");

    let (mut socket, _response) =
        tokio::time::timeout(config.connect_timeout, tokio_tungstenite::connect_async(url.as_str()))
            .await
            .map_err(|_| {
                RelayError::Timeout(format!(
                    "upstream handshake exceeded {}s",
                    config.connect_timeout.as_secs()
                ))
            })?
            .map_err(|e| RelayError::ConnectionFailed(config.redact(&e.to_string())))?;

    socket
        .send(Message::text(payload))
        .await
        .map_err(|e| RelayError::WebSocket(config.redact(&e.to_string())))?;

    info!(model = %config.model, "Connected to Gemini Live");
    Ok(socket)
}
