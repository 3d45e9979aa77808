//! Relay WebSocket handler
//!
//! Accepts a browser voice client, opens a matching Gemini Live socket
//! initialised with the session's prompt and tool manifest, and forwards
//! frames between the two until either side ends.

use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::gemini::{GeminiLiveConfig, build_setup_message, connect_upstream};
use crate::core::relay::{CLOSE_INTERNAL_ERROR, EndReason, relay};
use crate::core::session::{SessionProfile, SessionQuery};
use crate::errors::AppResult;
use crate::state::AppState;

/// Maximum WebSocket frame size (10 MB)
const MAX_WS_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Maximum WebSocket message size (10 MB)
const MAX_WS_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Close reason sent when the upstream cannot be reached.
const UPSTREAM_UNAVAILABLE: &str = "upstream unavailable";

/// Relay WebSocket handler
///
/// Validates the session query and upstream configuration before upgrading,
/// so bad requests are answered with a plain HTTP error instead of an
/// accepted-then-closed socket.
///
/// # Query parameters
/// * `session` - caller-chosen session id (`[A-Za-z0-9_-]{1,64}`); generated when absent
/// * `name` - display name woven into the system prompt
/// * `company` - company name woven into the system prompt
///
/// # Errors
/// * 400 for an invalid session id
/// * 503 when no upstream API key is configured
pub async fn relay_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> AppResult<Response> {
    let profile = SessionProfile::from_query(query)?;
    let upstream = GeminiLiveConfig::from_settings(&state.config.gemini).inspect_err(|e| {
        warn!(session_id = %profile.session_id, "Refusing relay: {}", e);
    })?;

    info!(
        session_id = %profile.session_id,
        "Relay WebSocket connection upgrade requested"
    );

    Ok(ws
        .max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_relay_socket(socket, profile, upstream)))
}

/// Run one relay to completion.
async fn handle_relay_socket(
    mut socket: WebSocket,
    profile: SessionProfile,
    upstream: GeminiLiveConfig,
) {
    let session_id = profile.session_id.clone();
    info!(session_id = %session_id, "Client connected");

    let setup = build_setup_message(&upstream, &profile);
    let upstream_socket = match connect_upstream(&upstream, &setup).await {
        Ok(s) => s,
        Err(e) => {
            error!(session_id = %session_id, "Failed to open upstream: {}", e);
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: CLOSE_INTERNAL_ERROR,
                    reason: UPSTREAM_UNAVAILABLE.into(),
                })))
                .await;
            return;
        }
    };

    info!(session_id = %session_id, "Upstream connected, relaying");

    let (client_tx, client_rx) = socket.split();
    let (upstream_tx, upstream_rx) = upstream_socket.split();

    let outcome = relay(client_tx, client_rx, upstream_tx, upstream_rx).await;

    match &outcome.reason {
        EndReason::Error(e) => warn!(
            session_id = %session_id,
            ended_by = %outcome.ended_by,
            client_to_upstream = outcome.client_to_upstream,
            upstream_to_client = outcome.upstream_to_client,
            "Relay ended with error: {}",
            upstream.redact(e)
        ),
        reason => info!(
            session_id = %session_id,
            ended_by = %outcome.ended_by,
            reason = ?reason,
            client_to_upstream = outcome.client_to_upstream,
            upstream_to_client = outcome.upstream_to_client,
            "Relay closed"
        ),
    }
}
