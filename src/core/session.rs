//! Per-connection session parameters.
//!
//! A session is described entirely by the query string of the upgrade
//! request: an opaque session identifier plus optional display fields used to
//! personalise the system prompt. Nothing here is persisted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Maximum accepted session identifier length.
pub const MAX_SESSION_ID_LEN: usize = 64;

/// Maximum retained length (in characters) of a display field.
pub const MAX_DISPLAY_FIELD_LEN: usize = 80;

static SESSION_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^[A-Za-z0-9_-]{{1,{MAX_SESSION_ID_LEN}}}$"))
        .expect("session id pattern is valid")
});

/// Errors raised while reading session parameters
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session id must be 1-64 characters of letters, digits, '_' or '-'")]
    InvalidSessionId,
}

/// Raw connection parameters as they arrive on the upgrade request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionQuery {
    #[serde(default, alias = "session_id", alias = "sessionId")]
    pub session: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

/// Opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    /// Accept a caller-supplied identifier if it passes the character allow-list.
    pub fn parse(raw: &str) -> Result<Self, SessionError> {
        if SESSION_ID_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(SessionError::InvalidSessionId)
        }
    }

    /// Fresh identifier for clients that did not supply one.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the relay knows about one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProfile {
    pub session_id: SessionId,
    pub display_name: Option<String>,
    pub company: Option<String>,
}

impl SessionProfile {
    /// Build a profile from upgrade-request parameters.
    ///
    /// A missing or empty session id is replaced with a generated one; a
    /// supplied id that fails the allow-list is an error.
    pub fn from_query(query: SessionQuery) -> Result<Self, SessionError> {
        let session_id = match query.session.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => SessionId::parse(raw)?,
            _ => SessionId::generate(),
        };

        Ok(Self {
            session_id,
            display_name: query.name.as_deref().and_then(clean_display_field),
            company: query.company.as_deref().and_then(clean_display_field),
        })
    }

    /// Profile with no display fields and a generated id.
    pub fn anonymous() -> Self {
        Self {
            session_id: SessionId::generate(),
            display_name: None,
            company: None,
        }
    }
}

/// Normalise a display field for prompt interpolation.
///
/// Control characters are dropped, runs of whitespace collapse to one space,
/// and the result is capped at [`MAX_DISPLAY_FIELD_LEN`] characters. Returns
/// `None` when nothing is left.
pub fn clean_display_field(raw: &str) -> Option<String> {
    let cleaned = raw
        .split_whitespace()
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let capped: String = cleaned.chars().take(MAX_DISPLAY_FIELD_LEN).collect();
    let capped = capped.trim_end().to_string();

    (!capped.is_empty()).then_some(capped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(session: Option<&str>, name: Option<&str>, company: Option<&str>) -> SessionQuery {
        SessionQuery {
            session: session.map(str::to_string),
            name: name.map(str::to_string),
            company: company.map(str::to_string),
        }
    }

    #[test]
    fn test_session_id_allow_list() {
        assert!(SessionId::parse("abc-123_XYZ").is_ok());
        assert!(SessionId::parse(&"a".repeat(MAX_SESSION_ID_LEN)).is_ok());

        assert_eq!(
            SessionId::parse("has space"),
            Err(SessionError::InvalidSessionId)
        );
        assert!(SessionId::parse("semi;colon").is_err());
        assert!(SessionId::parse("../etc/passwd").is_err());
        assert!(SessionId::parse("").is_err());
        assert!(SessionId::parse(&"a".repeat(MAX_SESSION_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_generated_session_id_passes_allow_list() {
        let id = SessionId::generate();
        assert!(SessionId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn test_profile_uses_supplied_session_id() {
        let profile =
            SessionProfile::from_query(query(Some("counter-7"), Some("Rahim"), None)).unwrap();

        assert_eq!(profile.session_id.as_str(), "counter-7");
        assert_eq!(profile.display_name.as_deref(), Some("Rahim"));
        assert!(profile.company.is_none());
    }

    #[test]
    fn test_profile_generates_missing_session_id() {
        let a = SessionProfile::from_query(query(None, None, None)).unwrap();
        let b = SessionProfile::from_query(query(Some("  "), None, None)).unwrap();

        assert!(!a.session_id.as_str().is_empty());
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn test_profile_rejects_bad_session_id() {
        let result = SessionProfile::from_query(query(Some("bad id!"), None, None));
        assert_eq!(result, Err(SessionError::InvalidSessionId));
    }

    #[test]
    fn test_clean_display_field() {
        assert_eq!(
            clean_display_field("  Green \n Cross\tPharmacy "),
            Some("Green Cross Pharmacy".to_string())
        );
        assert_eq!(
            clean_display_field("Ra\u{0007}him"),
            Some("Rahim".to_string())
        );
        assert_eq!(clean_display_field("   "), None);
        assert_eq!(clean_display_field("\u{0000}"), None);

        let long = "x".repeat(MAX_DISPLAY_FIELD_LEN * 2);
        assert_eq!(
            clean_display_field(&long).unwrap().chars().count(),
            MAX_DISPLAY_FIELD_LEN
        );
    }

    #[test]
    fn test_clean_display_field_keeps_unicode() {
        assert_eq!(
            clean_display_field("রহিম ফার্মেসি"),
            Some("রহিম ফার্মেসি".to_string())
        );
    }
}
