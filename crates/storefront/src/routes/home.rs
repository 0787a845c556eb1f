//! Landing page and the callback request form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use skillcoders_core::Zone;

use crate::filters;
use crate::middleware::{CspNonce, Visitor};
use crate::platform::CallbackSubmission;
use crate::routes::page::{MessageQuery, Page};
use crate::state::AppState;

/// Callback request form data.
#[derive(Debug, Deserialize)]
pub struct CallbackForm {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub mail_id: String,
    pub comment: String,
}

impl CallbackForm {
    fn into_submission(self) -> Result<CallbackSubmission, &'static str> {
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let phone_number = self.phone_number.trim();
        let comment = self.comment.trim();

        if first_name.is_empty() || last_name.is_empty() {
            return Err("Please enter your name.");
        }
        if phone_number.is_empty() {
            return Err("Please enter your phone number.");
        }
        if comment.is_empty() {
            return Err("Please tell us how we can help you.");
        }

        Ok(CallbackSubmission {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            phone_number: phone_number.to_string(),
            mail_id: self.mail_id.trim().to_string(),
            comment: comment.to_string(),
        })
    }
}

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct LandingTemplate {
    pub page: Page,
}

/// Display the landing page, or send a logged-in visitor home.
#[instrument(skip_all)]
pub async fn landing(
    State(state): State<AppState>,
    visitor: Visitor,
    nonce: CspNonce,
    Query(query): Query<MessageQuery>,
) -> Response {
    if let Some(home) = visitor.decide(Zone::Landing).location() {
        return Redirect::to(home).into_response();
    }

    let page = Page::new(&state, &visitor, nonce).await.with_query(&query);
    LandingTemplate { page }.into_response()
}

/// Handle the callback request form.
#[instrument(skip_all)]
pub async fn request_callback(
    State(state): State<AppState>,
    visitor: Visitor,
    nonce: CspNonce,
    Form(form): Form<CallbackForm>,
) -> Response {
    let result = match form.into_submission() {
        Ok(submission) => state
            .platform()
            .submit_callback(&submission)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Callback request failed");
                "Something went wrong. Please try again."
            }),
        Err(message) => Err(message),
    };

    match result {
        Ok(()) => {
            let home = visitor.access_class().home_path();
            Redirect::to(&format!("{home}?success=callback")).into_response()
        }
        Err(message) => {
            let page = Page::new(&state, &visitor, nonce).await.with_error(message);
            LandingTemplate { page }.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(first: &str, phone: &str, comment: &str) -> CallbackForm {
        CallbackForm {
            first_name: first.to_string(),
            last_name: "Rao".to_string(),
            phone_number: phone.to_string(),
            mail_id: " asha@example.com ".to_string(),
            comment: comment.to_string(),
        }
    }

    #[test]
    fn test_callback_form_trims_fields() {
        let submission = form(" Asha ", "9876543210", "Call me").into_submission();
        let submission = submission.as_ref().map(|s| (s.first_name.as_str(), s.mail_id.as_str()));
        assert_eq!(submission, Ok(("Asha", "asha@example.com")));
    }

    #[test]
    fn test_callback_form_requires_fields() {
        assert!(form("  ", "9876543210", "Call me").into_submission().is_err());
        assert!(form("Asha", "", "Call me").into_submission().is_err());
        assert!(form("Asha", "9876543210", " ").into_submission().is_err());
    }
}
