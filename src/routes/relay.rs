//! Relay WebSocket route configuration

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::relay::relay_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the relay WebSocket router
///
/// # Endpoint
///
/// `GET /ws?session=<id>&name=<display>&company=<display>` - WebSocket upgrade
///
/// # Protocol
///
/// Once upgraded, the server opens a Gemini Live session on the client's
/// behalf and sends the setup frame itself. From then on every text or
/// binary frame is forwarded unchanged in both directions:
///
/// ```json
/// // Client sends (forwarded upstream as-is)
/// {"realtimeInput": {"mediaChunks": [{"mimeType": "audio/pcm;rate=16000", "data": "..."}]}}
///
/// // Upstream sends (forwarded to the client as-is)
/// {"serverContent": {"modelTurn": {"parts": [{"inlineData": {"mimeType": "audio/pcm;rate=24000", "data": "..."}}]}}}
/// {"toolCall": {"functionCalls": [{"id": "...", "name": "add_to_cart", "args": {"medicine_name": "paracetamol", "quantity": 2}}]}}
/// ```
///
/// Closing either side closes the other.
///
/// The origin guard is applied by [`crate::routes::create_app`].
pub fn create_relay_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws", get(relay_handler))
        .layer(TraceLayer::new_for_http())
}
