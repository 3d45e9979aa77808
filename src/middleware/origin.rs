//! Origin allow-list for the relay endpoint
//!
//! Browsers always send `Origin` on WebSocket upgrades, and CORS does not
//! apply to them, so the check has to run before the handler accepts the
//! upgrade.
//!
//! ```ignore
//! use axum::Router;
//! use solanacy_relay::middleware::origin_guard_middleware;
//!
//! let app = Router::new()
//!     .route("/ws", get(relay_handler))
//!     .layer(axum::middleware::from_fn_with_state(
//!         state.clone(),
//!         origin_guard_middleware,
//!     ));
//! ```

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::errors::AppError;
use crate::state::AppState;

/// Reject requests whose `Origin` is not in the configured allow-list.
///
/// Returns 403 Forbidden before any upstream resource is touched. A request
/// without an `Origin` header is only admitted when the list contains `*`.
pub async fn origin_guard_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok());

    if !state.config.is_origin_allowed(origin) {
        tracing::warn!(
            origin = origin.unwrap_or("<none>"),
            path = %request.uri().path(),
            "Rejecting request: origin not allowed"
        );
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
