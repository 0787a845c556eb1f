//! Authentication route handlers.
//!
//! Login and registration forward to the platform API; the platform's own
//! error message is shown when it sends one.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{CspNonce, RequireSession, Visitor};
use crate::routes::page::{MessageQuery, Page};
use crate::services::auth::{AuthError, AuthService, RegistrationInput};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: Page,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: Page,
    pub name: String,
    pub email: String,
    pub phone: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip_all)]
pub async fn login_page(
    State(state): State<AppState>,
    visitor: Visitor,
    nonce: CspNonce,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        page: Page::new(&state, &visitor, nonce).await.with_query(&query),
        email: String::new(),
    }
}

/// Handle login form submission.
///
/// Admins land on the admin dashboard, everyone else on their dashboard.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
    nonce: CspNonce,
    Form(form): Form<LoginForm>,
) -> Response {
    match AuthService::new(&state)
        .login(&session, &form.email, &form.password)
        .await
    {
        Ok(access) => {
            let username = crate::middleware::auth::read_markers(&session)
                .await
                .username
                .unwrap_or_default();
            set_sentry_user(&username);
            Redirect::to(access.home_path()).into_response()
        }
        Err(e) => {
            log_auth_failure("Login", &e);
            LoginTemplate {
                page: Page::new(&state, &visitor, nonce)
                    .await
                    .with_error(e.user_message()),
                email: form.email,
            }
            .into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip_all)]
pub async fn register_page(
    State(state): State<AppState>,
    visitor: Visitor,
    nonce: CspNonce,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    RegisterTemplate {
        page: Page::new(&state, &visitor, nonce).await.with_query(&query),
        name: String::new(),
        email: String::new(),
        phone: String::new(),
    }
}

/// Handle registration form submission.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    visitor: Visitor,
    nonce: CspNonce,
    Form(form): Form<RegisterForm>,
) -> Response {
    let input = RegistrationInput {
        name: &form.name,
        email: &form.email,
        password: &form.password,
        phone: &form.phone,
    };

    match AuthService::new(&state).register(input).await {
        Ok(()) => Redirect::to("/login?success=registered").into_response(),
        Err(e) => {
            log_auth_failure("Registration", &e);
            let message = match &e {
                AuthError::Platform(err) => err
                    .user_message()
                    .map_or_else(|| "Registration failed!".to_string(), String::from),
                other => other.user_message(),
            };
            RegisterTemplate {
                page: Page::new(&state, &visitor, nonce)
                    .await
                    .with_error(message),
                name: form.name,
                email: form.email,
                phone: form.phone,
            }
            .into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    RequireSession { visitor, token }: RequireSession,
) -> Response {
    if let Err(e) = AuthService::new(&state)
        .logout(&session, &visitor, &token)
        .await
    {
        tracing::error!(error = %e, "Failed to clear session on logout");
        return Redirect::to("/?error=session").into_response();
    }

    clear_sentry_user();
    Redirect::to("/login?success=logged_out").into_response()
}

fn log_auth_failure(action: &str, error: &AuthError) {
    if error.is_server_error() {
        tracing::error!(error = %error, "{action} failed");
    } else {
        tracing::info!(error = %error, "{action} rejected");
    }
}
