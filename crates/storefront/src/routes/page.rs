//! Data every full page shares: navigation, notices and the script nonce.

use serde::Deserialize;

use skillcoders_core::AccessClass;

use crate::middleware::{CspNonce, Visitor};
use crate::platform::Profile;
use crate::state::AppState;

/// Query parameters for error/success display.
///
/// Only known codes are shown; anything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Text for an `?error=` code.
#[must_use]
pub fn error_text(code: &str) -> Option<&'static str> {
    Some(match code {
        "auth_required" => "Authentication required! Please login.",
        "unavailable" => "Something went wrong! Please try again.",
        "session" => "Your session could not be saved. Please try again.",
        "cart" => "Could not update your cart. Please try again.",
        "not_found" => "That item no longer exists.",
        _ => return None,
    })
}

/// Text for a `?success=` code.
#[must_use]
pub fn success_text(code: &str) -> Option<&'static str> {
    Some(match code {
        "registered" => "Registration successful! Please login.",
        "logged_out" => "You have been logged out.",
        "callback" => "Callback request submitted successfully!",
        "cart_added" => "Course added to cart successfully! 🎉",
        "cart_removed" => "Course removed from cart.",
        "payment" => "Payment successful! 🎉",
        "internship" => "Your application was submitted successfully!",
        "course_added" => "Course added successfully!",
        "callback_completed" => "Updated Successfully!!",
        "applicant_selected" => "Applicant marked as selected.",
        _ => return None,
    })
}

/// Shared page chrome.
#[derive(Debug, Clone)]
pub struct Page {
    pub nonce: String,
    pub access: AccessClass,
    pub username: String,
    pub cart_count: i64,
    pub profile: Option<Profile>,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl Page {
    /// Chrome for `visitor`. Signed-in visitors get their profile loaded once
    /// per visitor context; only ordinary users see the cart badge.
    pub async fn new(state: &AppState, visitor: &Visitor, nonce: CspNonce) -> Self {
        let access = visitor.access_class();
        let profile = visitor.profile(state.platform()).await;
        let cart_count = if access == AccessClass::User {
            visitor.context.cart().read()
        } else {
            0
        };

        Self {
            nonce: nonce.0,
            access,
            username: visitor.username().to_string(),
            cart_count,
            profile,
            error: None,
            success: None,
        }
    }

    /// Show the notices named by the query's codes.
    #[must_use]
    pub fn with_query(mut self, query: &MessageQuery) -> Self {
        self.error = query.error.as_deref().and_then(error_text).map(String::from);
        self.success = query
            .success
            .as_deref()
            .and_then(success_text)
            .map(String::from);
        self
    }

    /// Show an error notice with the given text.
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.access.is_admin()
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.access == AccessClass::User
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        !self.access.is_authenticated()
    }

    /// Where "home" is for this visitor.
    #[must_use]
    pub fn home_path(&self) -> &'static str {
        self.access.home_path()
    }

    /// Avatar letter for the navigation bar.
    #[must_use]
    pub fn initial(&self) -> String {
        self.profile.as_ref().map_or_else(
            || {
                self.username
                    .chars()
                    .next()
                    .map(|c| c.to_uppercase().collect())
                    .unwrap_or_default()
            },
            Profile::initial,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(access: AccessClass) -> Page {
        Page {
            nonce: String::new(),
            access,
            username: "asha".to_string(),
            cart_count: 0,
            profile: None,
            error: None,
            success: None,
        }
    }

    #[test]
    fn test_unknown_codes_are_dropped() {
        let query = MessageQuery {
            error: Some("<script>".to_string()),
            success: Some("registered".to_string()),
        };
        let page = page(AccessClass::Anonymous).with_query(&query);
        assert_eq!(page.error, None);
        assert_eq!(page.success.as_deref(), Some("Registration successful! Please login."));
    }

    #[test]
    fn test_auth_required_notice() {
        assert_eq!(
            error_text("auth_required"),
            Some("Authentication required! Please login.")
        );
    }

    #[test]
    fn test_home_path_follows_access() {
        assert_eq!(page(AccessClass::Anonymous).home_path(), "/");
        assert_eq!(page(AccessClass::User).home_path(), "/dashboard");
        assert_eq!(page(AccessClass::Admin).home_path(), "/admin/dashboard");
        assert_eq!(page(AccessClass::User).initial(), "A");
    }
}
