use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::api;
use crate::state::AppState;
use std::sync::Arc;

/// Maximum JSON body accepted by `/voice` (10 MB)
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Create the plain HTTP router
///
/// - `GET /` - plain-text health check
/// - `POST /voice` - single-turn text reply
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::health_check))
        .route("/voice", post(api::voice_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
}
