//! Cross-window completion message contract
//!
//! The popup's landing page reports the OAuth outcome back to the host as a
//! structured message tagged `OAUTH_SUCCESS` or `OAUTH_ERROR`. Messages are
//! only trusted when their origin matches the host's origin exactly;
//! everything else is discarded unconditionally.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sender origin of an inbound message (scheme + host + port).
///
/// Compared for exact equality against the expected origin. No
/// normalization is performed beyond what the producer sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin(String);

impl Origin {
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome reported by the popup's landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CompletionMessage {
    /// The user granted access; `code` and `state` go to the exchange call.
    #[serde(rename = "OAUTH_SUCCESS")]
    Success { code: String, state: String },

    /// The provider reported a failure (e.g. `access_denied`).
    #[serde(rename = "OAUTH_ERROR")]
    Failure { error: String },
}

impl CompletionMessage {
    /// Parse the raw message payload.
    ///
    /// Returns `None` for anything that is not a well-formed completion
    /// message; unrelated window traffic is expected and ignored.
    pub fn parse(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}

/// A completion message together with the origin it arrived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub origin: Origin,
    pub message: CompletionMessage,
}

impl InboundMessage {
    pub fn new(origin: Origin, message: CompletionMessage) -> Self {
        Self { origin, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_message() {
        let msg =
            CompletionMessage::parse(r#"{"type":"OAUTH_SUCCESS","code":"abc","state":"xyz"}"#)
                .unwrap();
        assert_eq!(
            msg,
            CompletionMessage::Success {
                code: "abc".to_string(),
                state: "xyz".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_error_message() {
        let msg =
            CompletionMessage::parse(r#"{"type":"OAUTH_ERROR","error":"access_denied"}"#).unwrap();
        assert_eq!(
            msg,
            CompletionMessage::Failure {
                error: "access_denied".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_rejects_unrelated_traffic() {
        assert!(CompletionMessage::parse(r#"{"type":"PING"}"#).is_none());
        assert!(CompletionMessage::parse("not json").is_none());
        assert!(CompletionMessage::parse(r#"{"code":"abc"}"#).is_none());
    }

    #[test]
    fn test_serialize_uses_tagged_form() {
        let json = serde_json::to_string(&CompletionMessage::Failure {
            error: "denied".to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"OAUTH_ERROR""#));
    }

    #[test]
    fn test_origin_exact_equality() {
        assert_eq!(
            Origin::new("https://app.example.com"),
            Origin::new("https://app.example.com")
        );
        assert_ne!(
            Origin::new("https://app.example.com"),
            Origin::new("https://evil.example.com")
        );
        // Trailing slash is a different origin string on purpose.
        assert_ne!(
            Origin::new("https://app.example.com"),
            Origin::new("https://app.example.com/")
        );
    }
}
