//! Records exchanged with the course platform API.
//!
//! Field names follow the platform's JSON exactly; optional fields default so
//! that a sparse record still renders.

use serde::{Deserialize, Serialize};

use skillcoders_core::{
    CallbackId, CallbackStatus, CourseId, Email, InternshipFormId, InternshipStatus, PhoneNumber,
    Price,
};

// =============================================================================
// Courses
// =============================================================================

/// A course as listed by the catalogue, dashboard and cart endpoints.
///
/// Catalogue endpoints identify the course with `id`; cart items use
/// `course_id`. [`Course::key`] picks whichever is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    #[serde(default)]
    pub id: Option<CourseId>,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    pub course_name: String,
    #[serde(default)]
    pub course_image: Option<String>,
    #[serde(default)]
    pub curriculum_pdf: Option<String>,
    #[serde(default)]
    pub instructor_name: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Course {
    /// The identifier cart and payment calls expect.
    #[must_use]
    pub fn key(&self) -> Option<CourseId> {
        self.course_id.or(self.id)
    }

    /// File name of the curriculum PDF, without any leading path.
    #[must_use]
    pub fn curriculum_file(&self) -> Option<&str> {
        self.curriculum_pdf
            .as_deref()
            .and_then(|path| path.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}

/// Body of `GET /carting/cart`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartItems {
    #[serde(default)]
    pub cart_items: Vec<Course>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CartItemRequest {
    pub course_id: CourseId,
}

// =============================================================================
// Accounts
// =============================================================================

/// Body of `GET /auth/api/user/me`.
///
/// `admin` is absent for accounts the platform does not classify.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub admin: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub mail_id: &'a str,
    pub password: &'a str,
}

/// Successful login.
#[derive(Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub admin: bool,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("admin", &self.admin)
            .finish()
    }
}

/// A new account, already validated.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub mail_id: Email,
    pub password: String,
    pub phone_number: PhoneNumber,
}

/// Body of `GET /auth/api/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mail_id: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub user_image: Option<String>,
    #[serde(default)]
    pub total_cart_count: i64,
}

impl Profile {
    /// First letter of the name, upper-cased, for the avatar fallback.
    #[must_use]
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

// =============================================================================
// Payments
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct CreateOrderRequest {
    pub course_id: CourseId,
    pub amount: Price,
}

/// Order created by the payment provider through the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub key: String,
    pub amount: serde_json::Value,
}

/// What the checkout widget hands back after a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub course_id: CourseId,
    pub amount: serde_json::Value,
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

// =============================================================================
// Support and internships
// =============================================================================

/// A visitor asking to be called back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackSubmission {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub mail_id: String,
    pub comment: String,
}

/// A stored callback request.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackRequest {
    pub id: CallbackId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub mail_id: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub status: CallbackStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl CallbackRequest {
    /// Date part of `created_at`, or the raw value if it is not RFC 3339.
    #[must_use]
    pub fn requested_on(&self) -> String {
        let Some(raw) = self.created_at.as_deref() else {
            return String::new();
        };
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.format("%d %b %Y").to_string())
            .unwrap_or_else(|_| raw.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CallbackList {
    #[serde(default)]
    pub data: Vec<CallbackRequest>,
}

/// An internship application as submitted by a visitor.
#[derive(Debug, Clone, Serialize)]
pub struct InternshipApplication {
    pub name: String,
    pub mail_id: Email,
    pub phone_number: String,
    pub college: String,
    /// Sent as a string, e.g. `"2025"`.
    pub year_of_passout: String,
    pub branch: String,
    pub domain: String,
}

/// A stored internship application.
#[derive(Debug, Clone, Deserialize)]
pub struct InternshipForm {
    pub id: InternshipFormId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub year_of_passout: serde_json::Value,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub status: Option<InternshipStatus>,
    #[serde(default)]
    pub user_image: Option<String>,
}

impl InternshipForm {
    #[must_use]
    pub fn status(&self) -> InternshipStatus {
        self.status.unwrap_or_default()
    }

    /// Passout year as sent, without JSON quoting.
    #[must_use]
    pub fn passout_year(&self) -> String {
        match &self.year_of_passout {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    #[must_use]
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ApproveInternshipRequest<'a> {
    pub applicant_email: &'a str,
    pub applicant_name: &'a str,
    pub id: InternshipFormId,
    /// The row's status as listed; absent for unreviewed rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InternshipStatus>,
}

// =============================================================================
// Admin
// =============================================================================

/// A course being created from the admin console.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: Price,
    pub instructor_name: String,
    pub course_image: Option<Upload>,
    pub curriculum_pdf: Option<Upload>,
}

/// A file forwarded from the admin form to the platform.
#[derive(Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_courses: i64,
    #[serde(default)]
    pub total_registrations: i64,
    #[serde(default)]
    pub active_users: i64,
    #[serde(default)]
    pub total_revenue: Price,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyRevenue {
    pub month: String,
    #[serde(default)]
    pub revenue: Price,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    #[serde(default)]
    pub course_count: i64,
}

/// Error body the platform attaches to non-success responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
