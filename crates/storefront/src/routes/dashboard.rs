//! Learner dashboard: registered and available courses.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use tracing::instrument;

use crate::filters;
use crate::middleware::{CspNonce, RequireUser, Visitor};
use crate::routes::courses::CourseCard;
use crate::routes::page::{MessageQuery, Page};
use crate::state::AppState;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: Page,
    pub available: Vec<CourseCard>,
    pub registered: Vec<CourseCard>,
}

/// Display the dashboard.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireUser { visitor, token }: RequireUser,
    nonce: CspNonce,
    Query(query): Query<MessageQuery>,
) -> Response {
    let page = Page::new(&state, &visitor, nonce).await.with_query(&query);
    render(&state, &visitor, &token, page).await
}

/// Render the dashboard with `page` as its chrome.
///
/// Both course lists load concurrently; a list that fails stays empty.
pub(crate) async fn render(
    state: &AppState,
    visitor: &Visitor,
    token: &SecretString,
    mut page: Page,
) -> Response {
    let platform = state.platform();
    let (available, registered) = tokio::join!(
        platform.available_courses(token),
        platform.registered_courses(token),
    );

    let available = available.unwrap_or_else(|e| {
        tracing::warn!(visitor = %visitor.id, error = %e, "Failed to load available courses");
        page.error.get_or_insert_with(|| "Failed to load courses.".to_string());
        Vec::new()
    });
    let registered = registered.unwrap_or_else(|e| {
        tracing::warn!(visitor = %visitor.id, error = %e, "Failed to load registered courses");
        Vec::new()
    });

    DashboardTemplate {
        page,
        available: CourseCard::list(platform, &available),
        registered: CourseCard::list(platform, &registered),
    }
    .into_response()
}
