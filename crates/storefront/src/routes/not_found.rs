//! Fallback for unknown paths.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::filters;
use crate::middleware::{CspNonce, Visitor};
use crate::routes::page::Page;
use crate::state::AppState;

/// 404 page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub page: Page,
}

/// Render the 404 page. "Return to Home" follows the visitor's markers.
pub async fn not_found(
    State(state): State<AppState>,
    visitor: Visitor,
    nonce: CspNonce,
) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            page: Page::new(&state, &visitor, nonce).await,
        },
    )
}
