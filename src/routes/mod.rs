pub mod api;
pub mod relay;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use http::{HeaderValue, Method, header::CONTENT_TYPE};
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::config::{ANY_ORIGIN, ServerConfig};
use crate::middleware::origin_guard_middleware;
use crate::state::AppState;

/// Assemble the full application router.
///
/// Layer order (outer to inner): security headers -> rate limit -> CORS ->
/// routes. The relay route additionally runs the origin guard before the
/// upgrade handler.
pub fn create_app(state: Arc<AppState>) -> Router {
    let relay_routes = relay::create_relay_router().layer(middleware::from_fn_with_state(
        state.clone(),
        origin_guard_middleware,
    ));

    let cors_layer = cors_layer(&state.config);

    // Rate limiting (disabled when rate >= 100000/s)
    let governor_layer = if state.config.is_rate_limited() {
        let governor_config = GovernorConfigBuilder::default()
            .period(replenish_period(state.config.rate_limit_requests_per_second))
            .burst_size(state.config.rate_limit_burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish();
        if governor_config.is_none() {
            warn!("Invalid rate limit settings, rate limiting disabled");
        }
        governor_config.map(GovernorLayer::new)
    } else {
        info!("Rate limiting disabled (rate >= 100000/s)");
        None
    };

    // Security headers
    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    api::create_api_router()
        .merge(relay_routes)
        .with_state(state)
        .layer(cors_layer)
        .layer(tower::util::option_layer(governor_layer))
        .layer(security_headers)
}

/// Interval between token refills for a limit of `requests_per_second`.
fn replenish_period(requests_per_second: u32) -> Duration {
    Duration::from_secs(1) / requests_per_second.max(1)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(false);

    if config.allowed_origins.iter().any(|o| o == ANY_ORIGIN) {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.trim().trim_end_matches('/').parse().ok())
        .collect();
    base.allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn limited_app(requests_per_second: u32, burst_size: u32) -> Router {
        let config = ServerConfig {
            rate_limit_requests_per_second: requests_per_second,
            rate_limit_burst_size: burst_size,
            ..Default::default()
        };
        let state = AppState::new(config).expect("state");
        create_app(state)
    }

    fn health_request() -> Request<Body> {
        Request::builder()
            .uri("/")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_replenish_period() {
        assert_eq!(replenish_period(1), Duration::from_secs(1));
        assert_eq!(replenish_period(60), Duration::from_secs(1) / 60);
        assert_eq!(replenish_period(1000), Duration::from_millis(1));
        assert_eq!(replenish_period(0), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_rate_limit_refills_at_configured_rate() {
        let app = limited_app(1000, 1);

        let first = app.clone().oneshot(health_request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        tokio::time::sleep(Duration::from_millis(200)).await;

        let second = app.oneshot(health_request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rate_limit_rejects_beyond_burst() {
        let app = limited_app(1, 1);

        let first = app.clone().oneshot(health_request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(health_request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let app = limited_app(100_000, 10);
        let response = app.oneshot(health_request()).await.unwrap();
        assert_eq!(
            response.headers().get(http::header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
        assert_eq!(
            response.headers().get(http::header::X_FRAME_OPTIONS).unwrap(),
            "DENY"
        );
    }
}
