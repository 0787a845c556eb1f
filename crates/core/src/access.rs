//! Route access resolution.
//!
//! Every navigation is classified into a [`Zone`] and resolved against the
//! visitor's markers into a [`Decision`]. The rules, in precedence order:
//!
//! 1. No session marker: gated zones redirect to login, ungated zones render.
//! 2. Admin role marker on a user-only zone: redirect to the admin home.
//! 3. Non-admin (or missing) role marker on an admin-only zone: redirect to
//!    the user home.
//! 4. Otherwise render.
//!
//! # Security
//!
//! The role marker only decides which screens are rendered. It is never an
//! authorization boundary: the platform API re-validates the bearer token and
//! the account's role on every privileged request.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Role marker value written for administrators.
pub const ADMIN_SENTINEL: &str = "admin";

/// Role marker value written for everyone else.
pub const USER_SENTINEL: &str = "normal_user";

/// Login page.
pub const LOGIN_PATH: &str = "/login";

/// Home of an authenticated, non-admin visitor.
pub const USER_HOME_PATH: &str = "/dashboard";

/// Home of an authenticated admin.
pub const ADMIN_HOME_PATH: &str = "/admin/dashboard";

/// Public landing page.
pub const LANDING_PATH: &str = "/";

/// The stored role hint.
///
/// Holds the raw marker string. Only the exact [`ADMIN_SENTINEL`] counts as
/// admin; any other value is treated as an ordinary user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleMarker(String);

impl RoleMarker {
    /// Build the marker from the `admin` flag reported by the platform API.
    #[must_use]
    pub fn from_admin_flag(admin: bool) -> Self {
        if admin {
            Self(ADMIN_SENTINEL.to_owned())
        } else {
            Self(USER_SENTINEL.to_owned())
        }
    }

    /// Wrap an arbitrary stored value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Whether the marker carries the admin sentinel.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0 == ADMIN_SENTINEL
    }

    /// Returns the raw marker value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a route requires of its visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    /// `/`: renders for anonymous visitors, sends everyone else home.
    Landing,
    /// Ungated content (login, register, course catalogue, not found).
    Public,
    /// Requires a session, any role (logout).
    Authenticated,
    /// Requires a session; admins are sent to their own home.
    User,
    /// Requires a session and the admin role marker.
    Admin,
}

impl Zone {
    /// Whether the zone needs a session marker at all.
    #[must_use]
    pub const fn is_gated(self) -> bool {
        matches!(self, Self::Authenticated | Self::User | Self::Admin)
    }
}

/// Access class derived from the markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessClass {
    Anonymous,
    User,
    Admin,
}

impl AccessClass {
    /// Classify a visitor from their markers.
    ///
    /// A session without a role marker counts as an ordinary user.
    #[must_use]
    pub fn from_markers(has_session: bool, role: Option<&RoleMarker>) -> Self {
        match (has_session, role) {
            (false, _) => Self::Anonymous,
            (true, Some(role)) if role.is_admin() => Self::Admin,
            (true, _) => Self::User,
        }
    }

    /// Where "home" is for this class.
    #[must_use]
    pub const fn home_path(self) -> &'static str {
        match self {
            Self::Anonymous => LANDING_PATH,
            Self::User => USER_HOME_PATH,
            Self::Admin => ADMIN_HOME_PATH,
        }
    }

    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Outcome of resolving a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Render,
    RedirectToLogin,
    RedirectToUserHome,
    RedirectToAdminHome,
}

impl Decision {
    /// The redirect target, or `None` when the content should render.
    #[must_use]
    pub const fn location(self) -> Option<&'static str> {
        match self {
            Self::Render => None,
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectToUserHome => Some(USER_HOME_PATH),
            Self::RedirectToAdminHome => Some(ADMIN_HOME_PATH),
        }
    }
}

/// Resolve a navigation attempt.
///
/// # Examples
///
/// ```
/// use skillcoders_core::access::{Decision, RoleMarker, Zone, resolve};
///
/// assert_eq!(resolve(false, None, Zone::Admin), Decision::RedirectToLogin);
///
/// let user = RoleMarker::from_admin_flag(false);
/// assert_eq!(resolve(true, Some(&user), Zone::Admin), Decision::RedirectToUserHome);
///
/// let admin = RoleMarker::from_admin_flag(true);
/// assert_eq!(resolve(true, Some(&admin), Zone::User), Decision::RedirectToAdminHome);
/// ```
#[must_use]
pub fn resolve(has_session: bool, role: Option<&RoleMarker>, zone: Zone) -> Decision {
    let class = AccessClass::from_markers(has_session, role);

    match (class, zone) {
        (AccessClass::Anonymous, zone) if zone.is_gated() => Decision::RedirectToLogin,
        (AccessClass::Anonymous, _) => Decision::Render,
        (AccessClass::Admin, Zone::User | Zone::Landing) => Decision::RedirectToAdminHome,
        (AccessClass::User, Zone::Admin | Zone::Landing) => Decision::RedirectToUserHome,
        _ => Decision::Render,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONES: [Zone; 5] = [
        Zone::Landing,
        Zone::Public,
        Zone::Authenticated,
        Zone::User,
        Zone::Admin,
    ];

    fn roles() -> [Option<RoleMarker>; 4] {
        [
            None,
            Some(RoleMarker::from_admin_flag(true)),
            Some(RoleMarker::from_admin_flag(false)),
            Some(RoleMarker::new("something-else")),
        ]
    }

    #[test]
    fn test_role_marker_sentinels() {
        assert!(RoleMarker::from_admin_flag(true).is_admin());
        assert!(!RoleMarker::from_admin_flag(false).is_admin());
        assert_eq!(RoleMarker::from_admin_flag(true).as_str(), ADMIN_SENTINEL);
        assert_eq!(RoleMarker::from_admin_flag(false).as_str(), USER_SENTINEL);
    }

    #[test]
    fn test_role_marker_is_exact_match() {
        assert!(!RoleMarker::new("Admin").is_admin());
        assert!(!RoleMarker::new(" admin").is_admin());
        assert!(!RoleMarker::new("").is_admin());
    }

    #[test]
    fn test_anonymous_table() {
        for role in &roles() {
            for zone in ZONES {
                let expected = if zone.is_gated() {
                    Decision::RedirectToLogin
                } else {
                    Decision::Render
                };
                assert_eq!(
                    resolve(false, role.as_ref(), zone),
                    expected,
                    "anonymous with role {role:?} on {zone:?}"
                );
            }
        }
    }

    #[test]
    fn test_admin_table() {
        let admin = RoleMarker::from_admin_flag(true);
        let expect = |zone: Zone| match zone {
            Zone::User | Zone::Landing => Decision::RedirectToAdminHome,
            _ => Decision::Render,
        };
        for zone in ZONES {
            assert_eq!(resolve(true, Some(&admin), zone), expect(zone), "{zone:?}");
        }
    }

    #[test]
    fn test_non_admin_table() {
        let expect = |zone: Zone| match zone {
            Zone::Admin | Zone::Landing => Decision::RedirectToUserHome,
            _ => Decision::Render,
        };
        for role in [
            None,
            Some(RoleMarker::from_admin_flag(false)),
            Some(RoleMarker::new("something-else")),
        ] {
            for zone in ZONES {
                assert_eq!(
                    resolve(true, role.as_ref(), zone),
                    expect(zone),
                    "role {role:?} on {zone:?}"
                );
            }
        }
    }

    #[test]
    fn test_scenarios() {
        let user = RoleMarker::from_admin_flag(false);
        let admin = RoleMarker::from_admin_flag(true);

        assert_eq!(
            resolve(false, None, Zone::Admin).location(),
            Some("/login")
        );
        assert_eq!(
            resolve(true, Some(&user), Zone::Admin).location(),
            Some("/dashboard")
        );
        assert_eq!(
            resolve(true, Some(&admin), Zone::User).location(),
            Some("/admin/dashboard")
        );
        assert_eq!(resolve(true, Some(&admin), Zone::Admin).location(), None);
    }

    #[test]
    fn test_access_class_home() {
        assert_eq!(AccessClass::from_markers(false, None).home_path(), "/");
        assert_eq!(
            AccessClass::from_markers(true, None).home_path(),
            "/dashboard"
        );
        let admin = RoleMarker::from_admin_flag(true);
        assert_eq!(
            AccessClass::from_markers(true, Some(&admin)).home_path(),
            "/admin/dashboard"
        );
        // Role marker without a session grants nothing.
        assert_eq!(
            AccessClass::from_markers(false, Some(&admin)),
            AccessClass::Anonymous
        );
    }

    #[test]
    fn test_role_marker_serde_is_raw_string() {
        let json = serde_json::to_string(&RoleMarker::from_admin_flag(false)).unwrap_or_default();
        assert_eq!(json, "\"normal_user\"");
    }
}
