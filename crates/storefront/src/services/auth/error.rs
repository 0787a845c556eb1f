//! Authentication error types.

use thiserror::Error;

use crate::platform::PlatformError;

/// Errors that can occur during login, registration or logout.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] skillcoders_core::EmailError),

    /// Invalid phone number.
    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] skillcoders_core::PhoneError),

    /// A required form field was blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The platform refused the request or could not be reached.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Session storage failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AuthError {
    /// Text safe to show the visitor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            Self::InvalidPhone(_) => "Please enter a valid 10-digit phone number.".to_string(),
            Self::MissingField(field) => format!("Please enter your {field}."),
            Self::Platform(err) => err
                .user_message()
                .map_or_else(|| "Something went wrong! Please try again.".to_string(), String::from),
            Self::Session(_) => "Your session could not be saved. Please try again.".to_string(),
        }
    }

    /// Whether this is the storefront's fault rather than the visitor's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Session(_))
    }
}
