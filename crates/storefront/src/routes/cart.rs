//! Cart route handlers.
//!
//! The cart itself lives on the platform. The badge count lives in the
//! visitor context: loaded once from the profile, then moved by one on every
//! successful add or remove without asking the platform again.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use skillcoders_core::{CourseId, Price};

use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{CspNonce, RequireUser};
use crate::routes::courses::CourseCard;
use crate::routes::dashboard;
use crate::routes::page::{MessageQuery, Page};
use crate::state::AppState;

/// Add/remove form data.
#[derive(Debug, Deserialize)]
pub struct CartForm {
    pub course_id: CourseId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: Page,
    pub items: Vec<CourseCard>,
    pub total: String,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

/// Whether the request came from HTMX and wants a fragment back.
fn is_fragment_request(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Display the cart page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireUser { visitor, token }: RequireUser,
    nonce: CspNonce,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let mut page = Page::new(&state, &visitor, nonce).await.with_query(&query);

    let courses = match state.platform().cart_items(&token).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(visitor = %visitor.id, error = %e, "Failed to fetch cart items");
            page = page.with_error("Error fetching cart items.");
            Vec::new()
        }
    };

    let total: Price = courses.iter().map(|c| c.price).sum();

    CartShowTemplate {
        page,
        items: CourseCard::list(state.platform(), &courses),
        total: total.to_string(),
    }
}

/// Add a course to the cart.
///
/// On success the badge goes up by one. HTMX callers get the badge fragment
/// and a `cart-updated` trigger; plain form posts go back to the dashboard.
#[instrument(skip_all, fields(visitor = %visitor.id, course_id = %form.course_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser { visitor, token }: RequireUser,
    nonce: CspNonce,
    headers: HeaderMap,
    Form(form): Form<CartForm>,
) -> Response {
    // Load the count first so the increment lands on the platform's number.
    visitor.cart_count(state.platform()).await;

    match state.platform().add_to_cart(&token, form.course_id).await {
        Ok(()) => {
            let count = visitor.context.cart().increment();
            add_breadcrumb(
                "cart",
                "Added course to cart",
                Some(&[("course_id", &form.course_id.to_string())]),
            );

            if is_fragment_request(&headers) {
                return (
                    AppendHeaders([("HX-Trigger", "cart-updated")]),
                    CartCountTemplate { count },
                )
                    .into_response();
            }
            Redirect::to("/dashboard?success=cart_added").into_response()
        }
        Err(e) => {
            tracing::warn!(visitor = %visitor.id, error = %e, "Failed to add course to cart");
            let message = e
                .user_message()
                .unwrap_or("Failed to add course to cart.")
                .to_string();
            let page = Page::new(&state, &visitor, nonce)
                .await
                .with_error(message);
            dashboard::render(&state, &visitor, &token, page).await
        }
    }
}

/// Remove a course from the cart.
#[instrument(skip_all, fields(visitor = %visitor.id, course_id = %form.course_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser { visitor, token }: RequireUser,
    headers: HeaderMap,
    Form(form): Form<CartForm>,
) -> Response {
    visitor.cart_count(state.platform()).await;

    match state
        .platform()
        .remove_from_cart(&token, form.course_id)
        .await
    {
        Ok(()) => {
            let count = visitor.context.cart().decrement();
            if is_fragment_request(&headers) {
                return (
                    AppendHeaders([("HX-Trigger", "cart-updated")]),
                    CartCountTemplate { count },
                )
                    .into_response();
            }
            Redirect::to("/cartItems?success=cart_removed").into_response()
        }
        Err(e) => {
            tracing::warn!(visitor = %visitor.id, error = %e, "Failed to remove course from cart");
            Redirect::to("/cartItems?error=cart").into_response()
        }
    }
}

/// Cart count badge fragment.
#[instrument(skip_all)]
pub async fn count(
    State(state): State<AppState>,
    RequireUser { visitor, .. }: RequireUser,
) -> impl IntoResponse {
    CartCountTemplate {
        count: visitor.cart_count(state.platform()).await,
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_fragment_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_fragment_request(&headers));
        headers.insert("hx-request", HeaderValue::from_static("true"));
        assert!(is_fragment_request(&headers));
    }
}
