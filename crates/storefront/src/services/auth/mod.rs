//! Authentication service.
//!
//! Logs visitors in and out against the platform API and keeps the session
//! markers and the visitor context in step with the result.

mod error;

pub use error::AuthError;

use secrecy::SecretString;
use tower_sessions::Session;

use skillcoders_core::{AccessClass, Email, PhoneNumber, RoleMarker};

use crate::config::MarkerConfig;
use crate::middleware::auth::{ensure_visitor_id, write_login};
use crate::middleware::visitor::Visitor;
use crate::platform::{PlatformClient, Registration};
use crate::services::visitors::{VisitorContext, VisitorRegistry};
use crate::state::AppState;

/// Raw registration input, before validation.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationInput<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub phone: &'a str,
}

impl RegistrationInput<'_> {
    /// Validate and normalize into what the platform expects.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<Registration, AuthError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        let mail_id = Email::parse(self.email)?;
        if self.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        let phone_number = PhoneNumber::parse_local(self.phone)?;

        Ok(Registration {
            name: name.to_string(),
            mail_id,
            password: self.password.to_string(),
            phone_number,
        })
    }
}

/// Authentication service.
pub struct AuthService<'a> {
    platform: &'a PlatformClient,
    visitors: &'a VisitorRegistry,
    markers: &'a MarkerConfig,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            platform: state.platform(),
            visitors: state.visitors(),
            markers: &state.config().markers,
        }
    }

    /// Log in with email and password.
    ///
    /// On success the markers are written, the session id is rotated and the
    /// visitor gets a fresh context with a new cart count and a settled probe.
    /// This is where an anonymous visitor's id is first stored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::MissingField` for bad input,
    /// `AuthError::Platform` if the platform rejects the credentials.
    #[tracing::instrument(skip(self, session, password))]
    pub async fn login(
        &self,
        session: &Session,
        email: &str,
        password: &str,
    ) -> Result<AccessClass, AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let login = self.platform.login(email.as_str(), password).await?;

        write_login(session, &login, self.markers).await?;
        let visitor = ensure_visitor_id(session).await?;
        session.cycle_id().await?;
        self.visitors
            .replace(visitor, VisitorContext::after_login())
            .await;

        let class = AccessClass::from_markers(true, Some(&RoleMarker::from_admin_flag(login.admin)));
        tracing::info!(admin = login.admin, "Visitor logged in");
        Ok(class)
    }

    /// Create an account. The visitor still has to log in afterwards.
    ///
    /// # Errors
    ///
    /// Returns a validation error, or `AuthError::Platform` if the platform refuses.
    #[tracing::instrument(skip_all)]
    pub async fn register(&self, input: RegistrationInput<'_>) -> Result<(), AuthError> {
        let registration = input.validate()?;
        self.platform.register(&registration).await?;
        tracing::info!("Account registered");
        Ok(())
    }

    /// Log out: tell the platform, forget the visitor, drop the session.
    ///
    /// A failing platform call does not stop the local logout.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be flushed.
    #[tracing::instrument(skip_all, fields(visitor = %visitor.id))]
    pub async fn logout(&self, session: &Session, visitor: &Visitor, token: &SecretString) -> Result<(), AuthError> {
        if let Err(e) = self.platform.logout(token).await {
            tracing::warn!(error = %e, "Platform logout failed; clearing local session anyway");
        }
        self.visitors.remove(visitor.id).await;
        session.flush().await?;
        Ok(())
    }
}
