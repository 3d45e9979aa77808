//! Environment variable loading
//!
//! Reads every setting from the process environment, falling back to
//! defaults. `.env` values are already present in the environment because
//! `main` loads them through dotenvy before configuration is read.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::{ConfigError, GeminiSettings, ServerConfig, TlsConfig, defaults};

/// Read a variable, treating empty or whitespace-only values as unset.
pub(super) fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a variable into `T`, returning `default` when unset.
pub(super) fn parse_env<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env_var(name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: name.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

/// Split a comma-separated list into trimmed entries.
///
/// Blank entries are kept so validation can reject them.
pub(super) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

pub(super) fn load() -> Result<ServerConfig, ConfigError> {
    let tls = match (env_var("TLS_CERT_PATH"), env_var("TLS_KEY_PATH")) {
        (Some(cert), Some(key)) => Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        }),
        (None, None) => None,
        _ => {
            return Err(ConfigError::Invalid(
                "TLS_CERT_PATH and TLS_KEY_PATH must be set together".to_string(),
            ));
        }
    };

    let mut gemini = GeminiSettings::default();
    gemini.api_key = env_var("GEMINI_API_KEY");
    if let Some(model) = env_var("GEMINI_MODEL") {
        gemini.model = model;
    }
    gemini.voice = env_var("GEMINI_VOICE");
    if let Some(url) = env_var("GEMINI_LIVE_URL") {
        gemini.live_url = url;
    }
    if let Some(url) = env_var("GEMINI_REST_URL") {
        gemini.rest_url = url;
    }
    if let Some(model) = env_var("GEMINI_TEXT_MODEL") {
        gemini.text_model = model;
    }
    gemini.connect_timeout = Duration::from_secs(parse_env(
        "UPSTREAM_CONNECT_TIMEOUT_SECONDS",
        defaults::CONNECT_TIMEOUT_SECS,
    )?);

    let allowed_origins = env_var("ALLOWED_ORIGINS")
        .map(|raw| split_list(&raw))
        .unwrap_or_else(defaults::allowed_origins);

    Ok(ServerConfig {
        host: env_var("HOST").unwrap_or_else(|| defaults::HOST.to_string()),
        port: parse_env("PORT", defaults::PORT)?,
        tls,
        gemini,
        allowed_origins,
        rate_limit_requests_per_second: parse_env(
            "RATE_LIMIT_REQUESTS_PER_SECOND",
            defaults::RATE_LIMIT_RPS,
        )?,
        rate_limit_burst_size: parse_env("RATE_LIMIT_BURST_SIZE", defaults::RATE_LIMIT_BURST)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" https://a.example ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(
            split_list(" https://a.example , ,"),
            vec!["https://a.example", "", ""]
        );
    }
}
