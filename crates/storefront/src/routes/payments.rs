//! Checkout JSON endpoints used by `static/js/checkout.js`.
//!
//! The order is created with the catalogue price looked up here, never a
//! price sent by the browser. The widget's response is forwarded to the
//! platform for signature verification.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use skillcoders_core::CourseId;

use crate::error::add_breadcrumb;
use crate::middleware::RequireUser;
use crate::platform::{Course, PaymentOrder, PaymentVerification, PlatformError};
use crate::state::AppState;

/// Merchant name shown in the checkout widget.
pub const MERCHANT_NAME: &str = "Live Courses";

/// Checkout widget accent colour.
pub const THEME_COLOR: &str = "#6d28d9";

/// Order request from the page script.
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub course_id: CourseId,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Prefill {
    pub name: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Theme {
    pub color: &'static str,
}

/// Options handed to the checkout widget, plus what verification needs later.
#[derive(Debug, Serialize)]
pub struct CheckoutOptions {
    pub key: String,
    /// Amount in paise.
    pub amount: i64,
    pub currency: &'static str,
    pub name: &'static str,
    pub description: String,
    pub order_id: String,
    pub prefill: Prefill,
    pub theme: Theme,
    pub course_id: CourseId,
    /// The order amount exactly as the platform reported it.
    pub order_amount: serde_json::Value,
}

impl CheckoutOptions {
    #[must_use]
    pub fn new(course: &Course, course_id: CourseId, order: PaymentOrder, username: &str) -> Self {
        Self {
            key: order.key,
            amount: course.price.paise(),
            currency: "INR",
            name: MERCHANT_NAME,
            description: format!("Payment for {}", course.course_name),
            order_id: order.order_id,
            prefill: Prefill {
                name: username.to_string(),
            },
            theme: Theme { color: THEME_COLOR },
            course_id,
            order_amount: order.amount,
        }
    }
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn platform_error(error: &PlatformError, fallback: &str) -> Response {
    let status = if error.is_unauthorized() {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::BAD_GATEWAY
    };
    json_error(status, error.user_message().unwrap_or(fallback))
}

/// Find a course the visitor can pay for.
///
/// Checks the public catalogue first, then the visitor's available courses.
async fn find_course(
    state: &AppState,
    token: &secrecy::SecretString,
    course_id: CourseId,
) -> Result<Option<Course>, PlatformError> {
    let platform = state.platform();
    let in_catalogue = platform
        .courses()
        .await?
        .into_iter()
        .find(|c| c.key() == Some(course_id));
    if in_catalogue.is_some() {
        return Ok(in_catalogue);
    }

    Ok(platform
        .available_courses(token)
        .await?
        .into_iter()
        .find(|c| c.key() == Some(course_id)))
}

/// Create a payment order and return the widget options.
#[instrument(skip_all, fields(visitor = %visitor.id, course_id = %request.course_id))]
pub async fn create_order(
    State(state): State<AppState>,
    RequireUser { visitor, token }: RequireUser,
    Json(request): Json<OrderRequest>,
) -> Response {
    let course = match find_course(&state, &token, request.course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return json_error(StatusCode::NOT_FOUND, "Course not found."),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to look up course for checkout");
            return platform_error(&e, "Failed to create Razorpay order.");
        }
    };

    match state
        .platform()
        .create_order(&token, request.course_id, course.price)
        .await
    {
        Ok(order) => {
            add_breadcrumb(
                "payment",
                "Created payment order",
                Some(&[("order_id", &order.order_id)]),
            );
            Json(CheckoutOptions::new(
                &course,
                request.course_id,
                order,
                visitor.username(),
            ))
            .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create payment order");
            platform_error(&e, "Failed to create Razorpay order.")
        }
    }
}

/// Forward the widget's response for verification.
#[instrument(skip_all, fields(visitor = %visitor.id))]
pub async fn verify(
    State(state): State<AppState>,
    RequireUser { visitor, token }: RequireUser,
    Json(verification): Json<PaymentVerification>,
) -> Response {
    match state.platform().verify_payment(&token, &verification).await {
        Ok(()) => {
            tracing::info!(order_id = %verification.order_id, "Payment verified");
            Json(json!({ "message": "Payment successfully! 🎉" })).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, order_id = %verification.order_id, "Payment verification failed");
            platform_error(&e, "Payment verification failed.")
        }
    }
}
