//! Configuration module for the Solanacy relay
//!
//! Configuration comes from environment variables (with `.env` support) and an
//! optional YAML file. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Example
//! ```rust,no_run
//! use solanacy_relay::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable base
//! let config = ServerConfig::from_file(&PathBuf::from("config.yaml"))?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

mod env;
mod yaml;

pub use yaml::YamlConfig;

/// Built-in defaults shared by the env and YAML loaders.
pub mod defaults {
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 3000;
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const RATE_LIMIT_RPS: u32 = 60;
    pub const RATE_LIMIT_BURST: u32 = 10;

    /// Local development front-ends.
    pub fn allowed_origins() -> Vec<String> {
        vec![
            "http://localhost:3000".to_string(),
            "http://localhost:5173".to_string(),
        ]
    }
}

/// Wildcard entry that admits any origin.
pub const ANY_ORIGIN: &str = "*";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// TLS configuration for HTTPS and WSS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Settings for the upstream Gemini service.
#[derive(Clone)]
pub struct GeminiSettings {
    /// API key; the relay refuses upgrades while this is unset
    pub api_key: Option<String>,
    /// Live model used for the relay setup frame
    pub model: String,
    /// Prebuilt voice name (e.g. "Puck", "Kore")
    pub voice: Option<String>,
    /// Live WebSocket endpoint
    pub live_url: String,
    /// REST base used by the text endpoint
    pub rest_url: String,
    /// Model used by the text endpoint
    pub text_model: String,
    /// Upper bound on opening the upstream socket
    pub connect_timeout: Duration,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: crate::core::gemini::DEFAULT_LIVE_MODEL.to_string(),
            voice: None,
            live_url: crate::core::gemini::GEMINI_LIVE_URL.to_string(),
            rest_url: crate::core::gemini::GEMINI_REST_URL.to_string(),
            text_model: crate::core::gemini::DEFAULT_TEXT_MODEL.to_string(),
            connect_timeout: Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("live_url", &self.live_url)
            .field("rest_url", &self.rest_url)
            .field("text_model", &self.text_model)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Zeroize the API key when settings are dropped.
impl Drop for GeminiSettings {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.api_key {
            key.zeroize();
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Upstream settings
    pub gemini: GeminiSettings,

    // Security configuration
    /// Browser origins permitted to open the relay socket; `*` admits any
    pub allowed_origins: Vec<String>,

    // Rate limiting configuration
    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            tls: None,
            gemini: GeminiSettings::default(),
            allowed_origins: defaults::allowed_origins(),
            rate_limit_requests_per_second: defaults::RATE_LIMIT_RPS,
            rate_limit_burst_size: defaults::RATE_LIMIT_BURST,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or the resulting
    /// configuration fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = env::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Environment variables (and `.env` values) provide the base
    /// configuration; values present in the YAML file override them.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml_config = YamlConfig::from_file(path)?;

        let mut config = env::load()?;
        config.apply_yaml(yaml_config)?;
        config.validate()?;

        Ok(config)
    }

    /// Overlay YAML values onto this configuration.
    fn apply_yaml(&mut self, yaml: YamlConfig) -> Result<(), ConfigError> {
        if let Some(server) = yaml.server {
            if let Some(host) = server.host {
                self.host = host;
            }
            if let Some(port) = server.port {
                self.port = port;
            }
            if let Some(tls) = server.tls {
                self.tls = match (tls.cert_path, tls.key_path) {
                    (Some(cert), Some(key)) => Some(TlsConfig {
                        cert_path: PathBuf::from(cert),
                        key_path: PathBuf::from(key),
                    }),
                    (None, None) => None,
                    _ => {
                        return Err(ConfigError::Invalid(
                            "server.tls requires both cert_path and key_path".to_string(),
                        ));
                    }
                };
            }
        }

        if let Some(gemini) = yaml.gemini {
            if gemini.api_key.is_some() {
                self.gemini.api_key = gemini.api_key;
            }
            if let Some(model) = gemini.model {
                self.gemini.model = model;
            }
            if gemini.voice.is_some() {
                self.gemini.voice = gemini.voice;
            }
            if let Some(url) = gemini.live_url {
                self.gemini.live_url = url;
            }
            if let Some(url) = gemini.rest_url {
                self.gemini.rest_url = url;
            }
            if let Some(model) = gemini.text_model {
                self.gemini.text_model = model;
            }
            if let Some(secs) = gemini.connect_timeout_seconds {
                self.gemini.connect_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(security) = yaml.security {
            if let Some(origins) = security.allowed_origins {
                self.allowed_origins = origins.into_iter().map(|o| o.trim().to_string()).collect();
            }
            if let Some(rps) = security.rate_limit_requests_per_second {
                self.rate_limit_requests_per_second = rps;
            }
            if let Some(burst) = security.rate_limit_burst_size {
                self.rate_limit_burst_size = burst;
            }
        }

        Ok(())
    }

    /// Check the merged configuration for values that cannot work at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_origins.iter().any(|o| o.is_empty()) {
            return Err(ConfigError::Invalid(
                "allowed origins must not contain empty entries".to_string(),
            ));
        }

        if self.gemini.connect_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "upstream connect timeout must be greater than zero".to_string(),
            ));
        }

        if self.rate_limit_requests_per_second == 0 || self.rate_limit_burst_size == 0 {
            return Err(ConfigError::Invalid(
                "rate limit values must be greater than zero".to_string(),
            ));
        }

        validate_url(&self.gemini.live_url, &["ws", "wss"], "GEMINI_LIVE_URL")?;
        validate_url(&self.gemini.rest_url, &["http", "https"], "GEMINI_REST_URL")?;

        Ok(())
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Whether rate limiting is active (disabled when rate >= 100000)
    pub fn is_rate_limited(&self) -> bool {
        self.rate_limit_requests_per_second < 100_000
    }

    /// Whether a browser origin may open the relay socket.
    ///
    /// Requests without an `Origin` header only pass under the `*` wildcard.
    /// Comparison ignores ASCII case and a trailing slash.
    pub fn is_origin_allowed(&self, origin: Option<&str>) -> bool {
        if self.allowed_origins.iter().any(|o| o == ANY_ORIGIN) {
            return true;
        }

        let Some(origin) = origin else {
            return false;
        };
        let origin = origin.trim().trim_end_matches('/');

        self.allowed_origins
            .iter()
            .any(|allowed| allowed.trim_end_matches('/').eq_ignore_ascii_case(origin))
    }
}

fn validate_url(raw: &str, schemes: &[&str], key: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(raw).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })?;

    if !schemes.contains(&parsed.scheme()) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        });
    }

    Ok(())
}
