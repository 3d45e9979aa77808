//! Gemini endpoint constants and the per-connection upstream configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::config::GeminiSettings;
use crate::core::relay::{RelayError, RelayResult};

/// Gemini Live bidirectional streaming endpoint.
pub const GEMINI_LIVE_URL: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Gemini REST API base.
pub const GEMINI_REST_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default native-audio Live model.
pub const DEFAULT_LIVE_MODEL: &str = "models/gemini-2.5-flash-native-audio-preview-12-2025";

/// Default model for single-turn text replies.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Response modality requested from the Live model.
pub const AUDIO_MODALITY: &str = "AUDIO";

/// Query parameter carrying the API key.
const KEY_PARAM: &str = "key";

/// Upstream connection parameters for one relay.
#[derive(Clone)]
pub struct GeminiLiveConfig {
    /// Live endpoint without credentials
    pub url: String,
    api_key: String,
    /// Model resource name
    pub model: String,
    /// Prebuilt voice name
    pub voice: Option<String>,
    /// Output modalities requested in the setup frame
    pub response_modalities: Vec<String>,
    /// Upper bound on the connect handshake
    pub connect_timeout: Duration,
}

impl GeminiLiveConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            model: model.into(),
            voice: None,
            response_modalities: vec![AUDIO_MODALITY.to_string()],
            connect_timeout: Duration::from_secs(crate::config::defaults::CONNECT_TIMEOUT_SECS),
        }
    }

    /// Derive the relay's upstream config from server settings.
    ///
    /// # Errors
    /// Returns [`RelayError::MissingApiKey`] when no key is configured.
    pub fn from_settings(settings: &GeminiSettings) -> RelayResult<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(RelayError::MissingApiKey)?;

        let mut config = Self::new(&settings.live_url, api_key, &settings.model);
        config.voice = settings.voice.clone();
        config.connect_timeout = settings.connect_timeout;
        Ok(config)
    }

    /// Model name in `models/<id>` form, as the setup frame expects.
    pub fn model_resource(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }

    /// Endpoint URL including the API key. Never log this value.
    pub fn endpoint_url(&self) -> RelayResult<Url> {
        let mut url =
            Url::parse(&self.url).map_err(|e| RelayError::InvalidEndpoint(e.to_string()))?;
        url.query_pairs_mut().append_pair(KEY_PARAM, &self.api_key);
        Ok(url)
    }

    /// Replace any occurrence of the API key in `text`.
    pub fn redact(&self, text: &str) -> String {
        if self.api_key.is_empty() {
            text.to_string()
        } else {
            text.replace(&self.api_key, "<redacted>")
        }
    }
}

impl fmt::Debug for GeminiLiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiLiveConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("response_modalities", &self.response_modalities)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl Drop for GeminiLiveConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.api_key.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_requires_key() {
        let settings = GeminiSettings::default();
        assert!(matches!(
            GeminiLiveConfig::from_settings(&settings),
            Err(RelayError::MissingApiKey)
        ));

        let mut settings = GeminiSettings::default();
        settings.api_key = Some(String::new());
        assert!(GeminiLiveConfig::from_settings(&settings).is_err());
    }

    #[test]
    fn test_from_settings_copies_fields() {
        let mut settings = GeminiSettings::default();
        settings.api_key = Some("k".to_string());
        settings.voice = Some("Kore".to_string());
        settings.connect_timeout = Duration::from_secs(4);

        let config = GeminiLiveConfig::from_settings(&settings).unwrap();
        assert_eq!(config.url, GEMINI_LIVE_URL);
        assert_eq!(config.model, DEFAULT_LIVE_MODEL);
        assert_eq!(config.voice.as_deref(), Some("Kore"));
        assert_eq!(config.connect_timeout, Duration::from_secs(4));
    }

    #[test]
    fn test_endpoint_url_appends_key() {
        let config = GeminiLiveConfig::new(GEMINI_LIVE_URL, "abc123", DEFAULT_LIVE_MODEL);
        let url = config.endpoint_url().unwrap();

        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.host_str(), Some("generativelanguage.googleapis.com"));
        assert_eq!(url.query(), Some("key=abc123"));
    }

    #[test]
    fn test_endpoint_url_keeps_existing_query() {
        let config = GeminiLiveConfig::new("ws://127.0.0.1:9/live?alt=ws", "abc", "m");
        let url = config.endpoint_url().unwrap();
        assert_eq!(url.query(), Some("alt=ws&key=abc"));
    }

    #[test]
    fn test_endpoint_url_invalid() {
        let config = GeminiLiveConfig::new("not a url", "abc", "m");
        assert!(matches!(
            config.endpoint_url(),
            Err(RelayError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_model_resource_prefix() {
        let config = GeminiLiveConfig::new(GEMINI_LIVE_URL, "k", "gemini-live-2.5-flash");
        assert_eq!(config.model_resource(), "models/gemini-live-2.5-flash");

        let config = GeminiLiveConfig::new(GEMINI_LIVE_URL, "k", DEFAULT_LIVE_MODEL);
        assert_eq!(config.model_resource(), DEFAULT_LIVE_MODEL);
    }

    #[test]
    fn test_redaction() {
        let config = GeminiLiveConfig::new(GEMINI_LIVE_URL, "secret-key", "m");
        assert_eq!(
            config.redact("failed: wss://host/?key=secret-key"),
            "failed: wss://host/?key=<redacted>"
        );
        assert!(!format!("{:?}", config).contains("secret-key"));
    }
}
