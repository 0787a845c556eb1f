//! Internship application review.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use skillcoders_core::InternshipFormId;

use crate::filters;
use crate::middleware::{CspNonce, RequireAdmin};
use crate::platform::InternshipForm;
use crate::routes::page::{MessageQuery, Page};
use crate::state::AppState;

/// Internship forms table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/internship_forms.html")]
pub struct InternshipFormsTemplate {
    pub page: Page,
    pub forms: Vec<InternshipForm>,
}

/// List internship applications.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin { visitor, token }: RequireAdmin,
    nonce: CspNonce,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let mut page = Page::new(&state, &visitor, nonce).await.with_query(&query);

    let forms = state
        .platform()
        .internship_forms(&token)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to fetch internship forms");
            page.error = Some("Failed to fetch internship forms.".to_string());
            Vec::new()
        });

    InternshipFormsTemplate { page, forms }
}

/// Select an applicant.
///
/// The applicant's name and email come from the platform's own record, not
/// from the submitted form.
#[instrument(skip_all, fields(id = %id))]
pub async fn select(
    State(state): State<AppState>,
    RequireAdmin { token, .. }: RequireAdmin,
    Path(id): Path<InternshipFormId>,
) -> Redirect {
    let platform = state.platform();

    let form = match platform.internship_forms(&token).await {
        Ok(forms) => forms.into_iter().find(|f| f.id == id),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch internship forms");
            return Redirect::to("/admin/internship-forms?error=unavailable");
        }
    };
    let Some(form) = form else {
        return Redirect::to("/admin/internship-forms?error=not_found");
    };

    match platform.select_applicant(&token, &form).await {
        Ok(()) => {
            tracing::info!("Applicant selected");
            Redirect::to("/admin/internship-forms?success=applicant_selected")
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to select applicant");
            Redirect::to("/admin/internship-forms?error=unavailable")
        }
    }
}
