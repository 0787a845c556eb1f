//! Internship application form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use skillcoders_core::Email;

use crate::filters;
use crate::middleware::{CspNonce, RequireUser};
use crate::platform::InternshipApplication;
use crate::routes::page::{MessageQuery, Page};
use crate::state::AppState;

/// Domains an applicant can pick from.
pub const DOMAINS: [&str; 20] = [
    "Artificial Intelligence",
    "Web Development",
    "Cloud Computing",
    "Cybersecurity",
    "Data Science",
    "Blockchain",
    "Machine Learning",
    "DevOps",
    "UI/UX Design",
    "Game Development",
    "Mobile App Development",
    "Internet of Things (IoT)",
    "Embedded Systems",
    "Networking",
    "Big Data",
    "Software Testing",
    "Business Intelligence",
    "Automation",
    "Database Management",
    "Full Stack Development",
];

pub const BRANCHES: [&str; 4] = [DEFAULT_BRANCH, "ECE", "Mech", "Others"];

pub const DEFAULT_BRANCH: &str = "B.Tech";

pub const FIRST_PASSOUT_YEAR: u16 = 2025;
pub const LAST_PASSOUT_YEAR: u16 = 2035;

/// Internship form data, also used to refill the form after an error.
#[derive(Debug, Clone, Deserialize)]
pub struct InternshipFormData {
    pub name: String,
    pub mail_id: String,
    pub phone_number: String,
    pub college: String,
    pub year_of_passout: String,
    pub branch: String,
    pub domain: String,
}

impl InternshipFormData {
    fn blank(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mail_id: String::new(),
            phone_number: String::new(),
            college: String::new(),
            year_of_passout: FIRST_PASSOUT_YEAR.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            domain: String::new(),
        }
    }

    /// Whether `branch` is the selected option.
    #[must_use]
    pub fn has_branch(&self, branch: &str) -> bool {
        self.branch == branch
    }

    #[must_use]
    pub fn has_domain(&self, domain: &str) -> bool {
        self.domain == domain
    }

    #[must_use]
    pub fn has_year(&self, year: u16) -> bool {
        self.passout_year() == Some(year)
    }

    fn passout_year(&self) -> Option<u16> {
        self.year_of_passout.trim().parse().ok()
    }

    fn to_application(&self) -> Result<InternshipApplication, String> {
        let required = [
            ("name", &self.name),
            ("phone number", &self.phone_number),
            ("college", &self.college),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("Please enter your {field}."));
        }

        let mail_id =
            Email::parse(&self.mail_id).map_err(|_| "Please enter a valid email address.".to_string())?;

        let year = self
            .passout_year()
            .filter(|y| (FIRST_PASSOUT_YEAR..=LAST_PASSOUT_YEAR).contains(y))
            .ok_or_else(|| "Please pick a year of passout from the list.".to_string())?;
        if !BRANCHES.contains(&self.branch.as_str()) {
            return Err("Please pick a branch from the list.".to_string());
        }
        if !DOMAINS.contains(&self.domain.as_str()) {
            return Err("Please select a domain.".to_string());
        }

        Ok(InternshipApplication {
            name: self.name.trim().to_string(),
            mail_id,
            phone_number: self.phone_number.trim().to_string(),
            college: self.college.trim().to_string(),
            year_of_passout: year.to_string(),
            branch: self.branch.clone(),
            domain: self.domain.clone(),
        })
    }
}

/// Internship application template.
#[derive(Template, WebTemplate)]
#[template(path = "internships.html")]
pub struct InternshipTemplate {
    pub page: Page,
    pub form: InternshipFormData,
    pub domains: &'static [&'static str],
    pub branches: &'static [&'static str],
    pub years: Vec<u16>,
}

impl InternshipTemplate {
    fn new(page: Page, form: InternshipFormData) -> Self {
        Self {
            page,
            form,
            domains: &DOMAINS,
            branches: &BRANCHES,
            years: (FIRST_PASSOUT_YEAR..=LAST_PASSOUT_YEAR).collect(),
        }
    }
}

/// Display the application form, prefilled with the visitor's name.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireUser { visitor, .. }: RequireUser,
    nonce: CspNonce,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let page = Page::new(&state, &visitor, nonce).await.with_query(&query);
    let form = InternshipFormData::blank(visitor.username());
    InternshipTemplate::new(page, form)
}

/// Submit an application.
#[instrument(skip_all, fields(visitor = %visitor.id, domain = %form.domain))]
pub async fn submit(
    State(state): State<AppState>,
    RequireUser { visitor, token }: RequireUser,
    nonce: CspNonce,
    Form(form): Form<InternshipFormData>,
) -> Response {
    let result = match form.to_application() {
        Ok(application) => state
            .platform()
            .submit_internship(&token, &application)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Internship submission failed");
                e.user_message()
                    .unwrap_or("Something went wrong")
                    .to_string()
            }),
        Err(message) => Err(message),
    };

    match result {
        Ok(()) => Redirect::to("/internships?success=internship").into_response(),
        Err(message) => {
            let page = Page::new(&state, &visitor, nonce).await.with_error(message);
            InternshipTemplate::new(page, form).into_response()
        }
    }
}
