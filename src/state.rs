use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;

/// Timeout for REST calls to the upstream service.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Process-wide state shared by every handler.
///
/// Holds only immutable configuration and a pooled HTTP client; relays keep
/// their own per-connection state.
pub struct AppState {
    pub config: ServerConfig,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Arc::new(Self {
            config,
            http_client,
        }))
    }
}
