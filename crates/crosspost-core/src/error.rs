//! Error types for the connection flow

use thiserror::Error;

use crate::platform::PlatformId;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    // ─────────────────────────────────────────────────────────────
    // Popup Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Popup window was blocked by the browser")]
    PopupBlocked,

    #[error("Authorization was cancelled by the user")]
    UserCancelled,

    #[error("An authorization attempt is already in progress")]
    AlreadyInProgress,

    #[error("Authorization timed out waiting for the popup to complete")]
    AuthorizationTimeout,

    #[error("The platform rejected the authorization: {error}")]
    Provider { error: String },

    #[error("Completion message channel closed unexpectedly")]
    ChannelClosed,

    // ─────────────────────────────────────────────────────────────
    // Backend Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Authorization code was rejected: {message}")]
    InvalidGrant { message: String },

    #[error("Unsupported platform: {platform}")]
    UnsupportedPlatform { platform: String },

    #[error("A {platform} account is already connected")]
    AlreadyConnected { platform: PlatformId },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }

    pub fn provider(error: impl Into<String>) -> Self {
        Self::Provider {
            error: error.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn invalid_grant(message: impl Into<String>) -> Self {
        Self::InvalidGrant {
            message: message.into(),
        }
    }

    pub fn unsupported_platform(platform: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            platform: platform.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error is terminal to one authorization attempt only.
    ///
    /// Recoverable errors return the wizard to the Authorize step for a
    /// user-driven retry; they never tear down the dialog itself.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::PopupBlocked
                | Error::UserCancelled
                | Error::AlreadyInProgress
                | Error::AuthorizationTimeout
                | Error::Provider { .. }
                | Error::Network { .. }
                | Error::InvalidGrant { .. }
                | Error::AlreadyConnected { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::network("connection refused");
        assert_eq!(err.to_string(), "Network error: connection refused");

        let err = Error::PopupBlocked;
        assert!(err.to_string().contains("blocked"));

        let err = Error::AlreadyConnected {
            platform: PlatformId::LinkedIn,
        };
        assert!(err.to_string().contains("linkedin"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_flow_errors_are_recoverable() {
        assert!(Error::PopupBlocked.is_recoverable());
        assert!(Error::UserCancelled.is_recoverable());
        assert!(Error::AuthorizationTimeout.is_recoverable());
        assert!(Error::provider("access_denied").is_recoverable());
        assert!(Error::network("timeout").is_recoverable());
        assert!(Error::invalid_grant("expired").is_recoverable());
    }

    #[test]
    fn test_infrastructure_errors_are_not_recoverable() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(!Error::from(io_err).is_recoverable());
        assert!(!Error::ChannelClosed.is_recoverable());
        assert!(!Error::config("missing field").is_recoverable());
    }

    #[test]
    fn test_error_constructors() {
        let _ = Error::invalid_url("not a url");
        let _ = Error::provider("access_denied");
        let _ = Error::network("test");
        let _ = Error::invalid_grant("test");
        let _ = Error::unsupported_platform("myspace");
        let _ = Error::config("test");
    }

    #[test]
    fn test_unsupported_platform_error() {
        let err = Error::unsupported_platform("myspace");
        assert!(err.to_string().contains("myspace"));
    }
}
