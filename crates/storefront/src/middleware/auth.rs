//! Route guards and session marker helpers.
//!
//! Each guard resolves the request's [`Visitor`] against a [`Zone`] and either
//! hands the handler the visitor (plus its bearer token) or redirects.
//!
//! # Security
//!
//! The role marker decides which screens render, nothing more. It is stored
//! server-side, but it is still only a hint copied from the platform's
//! answer at login or probe time. Every privileged call forwards the bearer
//! token and the platform re-checks the account's role itself; a stale or
//! wrong role marker can at most show an admin screen whose data calls fail.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use secrecy::SecretString;
use tower_sessions::Session;

use skillcoders_core::{Decision, RoleMarker, Zone};

use crate::config::MarkerConfig;
use crate::error::AppError;
use crate::middleware::visitor::Visitor;
use crate::models::{Marker, Markers, VisitorId, session_keys};
use crate::platform::LoginResponse;

/// Notice code shown on the login page after a guard bounced the visitor.
pub const AUTH_REQUIRED: &str = "auth_required";

/// Response when a guard refuses a request.
#[derive(Debug)]
pub enum AuthRejection {
    /// Send the visitor somewhere else (HTML requests).
    Redirect(Decision),
    /// Plain error response (API requests, misconfiguration).
    Error(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(Decision::RedirectToLogin) => {
                Redirect::to(&format!("{}?error={AUTH_REQUIRED}", skillcoders_core::access::LOGIN_PATH))
                    .into_response()
            }
            Self::Redirect(decision) => decision
                .location()
                .map_or_else(|| StatusCode::FORBIDDEN.into_response(), |to| Redirect::to(to).into_response()),
            Self::Error(e) => e.into_response(),
        }
    }
}

/// Whether the request targets the JSON API. Nested routers strip their
/// prefix from `uri`, so the original URI is checked first.
fn is_api_request(parts: &Parts) -> bool {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |OriginalUri(uri)| uri)
        .path()
        .starts_with("/api/")
}

/// Resolve `zone` for the request, yielding the visitor and token on success.
fn guard(parts: &Parts, zone: Zone) -> Result<(Visitor, SecretString), AuthRejection> {
    let visitor = parts
        .extensions
        .get::<Visitor>()
        .cloned()
        .ok_or(AuthRejection::Error(AppError::Internal(
            "visitor middleware not installed",
        )))?;

    match visitor.decide(zone) {
        Decision::Render => {}
        Decision::RedirectToLogin if is_api_request(parts) => {
            return Err(AuthRejection::Error(AppError::Unauthorized("no session")));
        }
        other => return Err(AuthRejection::Redirect(other)),
    }

    let token = visitor
        .token()
        .cloned()
        .ok_or(AuthRejection::Redirect(Decision::RedirectToLogin))?;
    Ok((visitor, token))
}

macro_rules! define_guard {
    ($(#[$meta:meta])* $name:ident => $zone:expr) => {
        $(#[$meta])*
        pub struct $name {
            pub visitor: Visitor,
            pub token: SecretString,
        }

        impl<S> FromRequestParts<S> for $name
        where
            S: Send + Sync,
        {
            type Rejection = AuthRejection;

            async fn from_request_parts(
                parts: &mut Parts,
                _state: &S,
            ) -> Result<Self, Self::Rejection> {
                let (visitor, token) = guard(parts, $zone)?;
                Ok(Self { visitor, token })
            }
        }
    };
}

define_guard!(
    /// Requires a session; admins are sent to the admin home.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// async fn cart(RequireUser { visitor, token }: RequireUser) -> impl IntoResponse {
    ///     // ...
    /// }
    /// ```
    RequireUser => Zone::User
);

define_guard!(
    /// Requires a session and the admin role marker; others go to the user home.
    RequireAdmin => Zone::Admin
);

define_guard!(
    /// Requires a session, any role.
    RequireSession => Zone::Authenticated
);

// =============================================================================
// Session Helpers
// =============================================================================

/// Read the live markers. Unreadable entries count as absent.
pub async fn read_markers(session: &Session) -> Markers {
    let token = session
        .get::<Marker<String>>(session_keys::ACCESS_TOKEN)
        .await
        .ok()
        .flatten();
    let username = session
        .get::<Marker<String>>(session_keys::USERNAME)
        .await
        .ok()
        .flatten();
    let role = session
        .get::<Marker<RoleMarker>>(session_keys::ROLE)
        .await
        .ok()
        .flatten();

    Markers::from_stored(token, username, role, Utc::now())
}

/// Store the markers a successful login hands back.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn write_login(
    session: &Session,
    login: &LoginResponse,
    ttl: &MarkerConfig,
) -> Result<(), tower_sessions::session::Error> {
    let now = Utc::now();
    session
        .insert(
            session_keys::ACCESS_TOKEN,
            Marker::new(login.token.clone(), now, ttl.session_ttl),
        )
        .await?;
    session
        .insert(
            session_keys::USERNAME,
            Marker::new(login.username.clone(), now, ttl.session_ttl),
        )
        .await?;
    write_role(session, &RoleMarker::from_admin_flag(login.admin), ttl.role_ttl).await
}

/// Rewrite the role marker with a fresh expiry.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn write_role(
    session: &Session,
    role: &RoleMarker,
    ttl: chrono::Duration,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::ROLE, Marker::new(role.clone(), Utc::now(), ttl))
        .await
}

/// Drop the token and role markers. Clearing absent markers is a no-op.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_credentials(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<Marker<String>>(session_keys::ACCESS_TOKEN)
        .await?;
    session
        .remove::<Marker<RoleMarker>>(session_keys::ROLE)
        .await?;
    Ok(())
}

/// The session's visitor id, minting one on first sight.
///
/// # Errors
///
/// Returns an error if the session cannot be read or modified.
pub async fn ensure_visitor_id(session: &Session) -> Result<VisitorId, tower_sessions::session::Error> {
    if let Some(id) = session.get::<VisitorId>(session_keys::VISITOR_ID).await? {
        return Ok(id);
    }
    let id = VisitorId::generate();
    session.insert(session_keys::VISITOR_ID, id).await?;
    Ok(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn login(admin: bool) -> LoginResponse {
        serde_json::from_value(serde_json::json!({
            "token": "tok-123",
            "username": "asha",
            "admin": admin,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_login_markers_round_trip() {
        let session = session();
        write_login(&session, &login(true), &MarkerConfig::default())
            .await
            .unwrap();

        let markers = read_markers(&session).await;
        assert!(markers.has_session());
        assert_eq!(markers.username.as_deref(), Some("asha"));
        assert!(markers.role.as_ref().is_some_and(RoleMarker::is_admin));
    }

    #[tokio::test]
    async fn test_clear_credentials_keeps_username() {
        let session = session();
        write_login(&session, &login(false), &MarkerConfig::default())
            .await
            .unwrap();

        clear_credentials(&session).await.unwrap();
        let markers = read_markers(&session).await;
        assert!(!markers.has_session());
        assert!(markers.role.is_none());
        assert_eq!(markers.username.as_deref(), Some("asha"));

        // Clearing again is harmless.
        clear_credentials(&session).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_role_marker_reads_absent() {
        let session = session();
        write_role(
            &session,
            &RoleMarker::from_admin_flag(true),
            chrono::Duration::seconds(-1),
        )
        .await
        .unwrap();
        assert!(read_markers(&session).await.role.is_none());
    }

    #[tokio::test]
    async fn test_visitor_id_is_stable() {
        let session = session();
        let first = ensure_visitor_id(&session).await.unwrap();
        let second = ensure_visitor_id(&session).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejection_responses() {
        let login = AuthRejection::Redirect(Decision::RedirectToLogin).into_response();
        assert_eq!(login.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            login.headers().get("location").unwrap(),
            "/login?error=auth_required"
        );

        let home = AuthRejection::Redirect(Decision::RedirectToAdminHome).into_response();
        assert_eq!(home.headers().get("location").unwrap(), "/admin/dashboard");

        assert_eq!(
            AuthRejection::Error(AppError::Unauthorized("no session"))
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
