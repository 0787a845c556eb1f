//! Callback request triage.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use skillcoders_core::CallbackId;

use crate::filters;
use crate::middleware::{CspNonce, RequireAdmin};
use crate::platform::CallbackRequest;
use crate::routes::page::{MessageQuery, Page};
use crate::state::AppState;

/// Callbacks table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/callbacks.html")]
pub struct CallbacksTemplate {
    pub page: Page,
    pub callbacks: Vec<CallbackRequest>,
}

/// List callback requests.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin { visitor, token }: RequireAdmin,
    nonce: CspNonce,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let mut page = Page::new(&state, &visitor, nonce).await.with_query(&query);

    let callbacks = state.platform().callbacks(&token).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to fetch callbacks");
        page.error = Some("Failed to fetch callbacks.".to_string());
        Vec::new()
    });

    CallbacksTemplate { page, callbacks }
}

/// Mark a callback request as completed.
#[instrument(skip_all, fields(id = %id))]
pub async fn complete(
    State(state): State<AppState>,
    RequireAdmin { token, .. }: RequireAdmin,
    Path(id): Path<CallbackId>,
) -> Redirect {
    match state.platform().complete_callback(&token, id).await {
        Ok(()) => Redirect::to("/admin/callbacks?success=callback_completed"),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to mark callback completed");
            Redirect::to("/admin/callbacks?error=unavailable")
        }
    }
}
