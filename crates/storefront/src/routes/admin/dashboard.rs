//! Admin dashboard: headline stats, monthly revenue, courses by category.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::filters;
use crate::middleware::{CspNonce, RequireAdmin};
use crate::platform::{CategoryCount, DashboardStats, MonthlyRevenue, PlatformError};
use crate::routes::page::{MessageQuery, Page};
use crate::state::AppState;

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub page: Page,
    pub stats: DashboardStats,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub categories: Vec<CategoryCount>,
}

fn or_default<T: Default>(result: Result<T, PlatformError>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to fetch {what}");
        T::default()
    })
}

/// Display the admin dashboard.
///
/// The three panels load concurrently; a panel whose call fails shows its
/// defaults while the others still render.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin { visitor, token }: RequireAdmin,
    nonce: CspNonce,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let platform = state.platform();
    let (page, stats, monthly_revenue, categories) = tokio::join!(
        Page::new(&state, &visitor, nonce),
        platform.dashboard_stats(&token),
        platform.monthly_revenue(&token),
        platform.courses_by_category(&token),
    );

    AdminDashboardTemplate {
        page: page.with_query(&query),
        stats: or_default(stats, "dashboard stats"),
        monthly_revenue: or_default(monthly_revenue, "monthly revenue"),
        categories: or_default(categories, "courses by category"),
    }
}
