//! Course platform API client.
//!
//! # Architecture
//!
//! - The platform owns every record and every rule; this client only moves
//!   JSON between the visitor's session and the API
//! - Bearer tokens are passed per call and never stored by the client
//! - The public course catalogue is cached via `moka` (5 minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use skillcoders_storefront::platform::PlatformClient;
//!
//! let client = PlatformClient::new(&config.platform)?;
//!
//! let login = client.login("asha@example.com", "hunter22").await?;
//! let token = SecretString::from(login.token);
//! let profile = client.profile(&token).await?;
//! ```

mod client;
pub mod types;

pub use client::PlatformClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the platform API.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The request never produced a response (connect failure, reset, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with a non-success status.
    #[error("Platform returned {status}{}", format_message(.message.as_deref()))]
    Status {
        status: u16,
        message: Option<String>,
    },

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl PlatformError {
    /// The platform's own `message`, suitable for showing to the visitor.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    /// Whether the platform rejected the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

fn format_message(message: Option<&str>) -> String {
    message.map_or_else(String::new, |m| format!(": {m}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = PlatformError::Status {
            status: 409,
            message: Some("Course already in cart".to_string()),
        };
        assert_eq!(err.to_string(), "Platform returned 409: Course already in cart");
        assert_eq!(err.user_message(), Some("Course already in cart"));

        let err = PlatformError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "Platform returned 500");
        assert_eq!(err.user_message(), None);
    }

    #[test]
    fn test_blank_message_is_not_surfaced() {
        let err = PlatformError::Status {
            status: 400,
            message: Some("  ".to_string()),
        };
        assert_eq!(err.user_message(), None);
    }

    #[test]
    fn test_is_unauthorized() {
        let status = |status| PlatformError::Status {
            status,
            message: None,
        };
        assert!(status(401).is_unauthorized());
        assert!(status(403).is_unauthorized());
        assert!(!status(404).is_unauthorized());
    }
}
