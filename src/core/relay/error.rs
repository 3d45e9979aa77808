use thiserror::Error;

/// Errors that can occur while establishing or running a relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No upstream API key configured
    #[error("Upstream API key not configured")]
    MissingApiKey,

    /// Upstream endpoint could not be turned into a valid URL
    #[error("Invalid upstream endpoint: {0}")]
    InvalidEndpoint(String),

    /// Connection to the upstream service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Operation timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
