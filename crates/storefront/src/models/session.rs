//! Session-related types.
//!
//! The visitor's markers live in the server-side session. Each marker carries
//! its own expiry; an expired marker reads exactly like a missing one.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skillcoders_core::{AccessClass, RoleMarker};

/// Session keys for visitor state.
pub mod keys {
    /// Bearer token issued by the platform at login.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Display name returned by login.
    pub const USERNAME: &str = "username";

    /// Role hint (`admin` / `normal_user`).
    pub const ROLE: &str = "role";

    /// Identifies the visitor's in-memory context.
    pub const VISITOR_ID: &str = "visitor_id";
}

/// A stored value with its own expiry instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker<T> {
    pub value: T,
    pub expires_at: DateTime<Utc>,
}

impl<T> Marker<T> {
    /// A marker that expires `ttl` after `now`.
    #[must_use]
    pub fn new(value: T, now: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            value,
            expires_at: now + ttl,
        }
    }

    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// The value, unless the marker has expired.
    #[must_use]
    pub fn into_live(self, now: DateTime<Utc>) -> Option<T> {
        self.is_live(now).then_some(self.value)
    }
}

/// Per-visitor key into the in-memory visitor registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(Uuid);

impl VisitorId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for VisitorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The live markers of one request.
#[derive(Clone, Default)]
pub struct Markers {
    pub token: Option<SecretString>,
    pub username: Option<String>,
    pub role: Option<RoleMarker>,
}

impl Markers {
    /// Keep only the markers still live at `now`.
    #[must_use]
    pub fn from_stored(
        token: Option<Marker<String>>,
        username: Option<Marker<String>>,
        role: Option<Marker<RoleMarker>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            token: token
                .and_then(|m| m.into_live(now))
                .map(SecretString::from),
            username: username.and_then(|m| m.into_live(now)),
            role: role.and_then(|m| m.into_live(now)),
        }
    }

    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn access_class(&self) -> AccessClass {
        AccessClass::from_markers(self.has_session(), self.role.as_ref())
    }
}

impl std::fmt::Debug for Markers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Markers")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("username", &self.username)
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use secrecy::ExposeSecret;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(&format!("2025-06-01T{hour:02}:00:00Z"))
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default()
    }

    #[test]
    fn test_marker_expiry_is_exclusive() {
        let marker = Marker::new("t".to_string(), at(1), Duration::hours(7));
        assert!(marker.is_live(at(7)));
        assert!(!marker.is_live(at(8)));
        assert_eq!(marker.clone().into_live(at(2)), Some("t".to_string()));
        assert_eq!(marker.into_live(at(9)), None);
    }

    #[test]
    fn test_expired_markers_read_as_absent() {
        let markers = Markers::from_stored(
            Some(Marker::new("tok".to_string(), at(0), Duration::hours(7))),
            Some(Marker::new("asha".to_string(), at(0), Duration::hours(7))),
            Some(Marker::new(
                RoleMarker::from_admin_flag(true),
                at(0),
                Duration::hours(1),
            )),
            at(3),
        );

        assert!(markers.has_session());
        assert_eq!(markers.username.as_deref(), Some("asha"));
        assert!(markers.role.is_none());
        // Role expired, so the session counts as an ordinary user.
        assert_eq!(markers.access_class(), AccessClass::User);
        assert_eq!(
            markers.token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("tok".to_string())
        );
    }

    #[test]
    fn test_expired_token_is_anonymous() {
        let markers = Markers::from_stored(
            Some(Marker::new("tok".to_string(), at(0), Duration::hours(7))),
            None,
            Some(Marker::new(
                RoleMarker::from_admin_flag(true),
                at(6),
                Duration::hours(7),
            )),
            at(8),
        );
        assert!(!markers.has_session());
        assert_eq!(markers.access_class(), AccessClass::Anonymous);
    }

    #[test]
    fn test_debug_redacts_token() {
        let markers = Markers {
            token: Some(SecretString::from("super-secret-token")),
            username: Some("asha".to_string()),
            role: None,
        };
        let debug = format!("{markers:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }
}
