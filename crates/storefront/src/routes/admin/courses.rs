//! Admin course creation.
//!
//! The multipart form is parsed here, checked, and re-sent to the platform
//! as a new multipart request. Files are held in memory while forwarding.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Query, State, multipart::MultipartError},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use skillcoders_core::Price;

use crate::filters;
use crate::middleware::{CspNonce, RequireAdmin};
use crate::platform::{NewCourse, Upload};
use crate::routes::page::{MessageQuery, Page};
use crate::state::AppState;

/// Categories a course can be filed under.
pub const COURSE_CATEGORIES: [&str; 16] = [
    "Artificial Intelligence",
    "Web Development",
    "Cloud Computing",
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

/// Largest accepted upload body (course image plus curriculum PDF).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Text fields of the add-course form, kept to refill it after an error.
#[derive(Debug, Clone, Default)]
pub struct CourseFields {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub instructor_name: String,
}

impl CourseFields {
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.category == category
    }
}

/// Add course template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/add_course.html")]
pub struct AddCourseTemplate {
    pub page: Page,
    pub form: CourseFields,
    pub categories: &'static [&'static str],
}

/// Display the add course form.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin { visitor, .. }: RequireAdmin,
    nonce: CspNonce,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    AddCourseTemplate {
        page: Page::new(&state, &visitor, nonce).await.with_query(&query),
        form: CourseFields::default(),
        categories: &COURSE_CATEGORIES,
    }
}

/// Everything read from the submitted form.
#[derive(Debug, Default)]
struct Submission {
    fields: CourseFields,
    course_image: Option<Upload>,
    curriculum_pdf: Option<Upload>,
}

impl Submission {
    async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(String::from) else {
                continue;
            };

            match name.as_str() {
                "course_image" | "curriculum_pdf" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(String::from);
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file was picked
                    if file_name.is_empty() || bytes.is_empty() {
                        continue;
                    }
                    let upload = Upload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    };
                    if name == "course_image" {
                        submission.course_image = Some(upload);
                    } else {
                        submission.curriculum_pdf = Some(upload);
                    }
                }
                _ => {
                    let value = field.text().await?;
                    let fields = &mut submission.fields;
                    match name.as_str() {
                        "title" => fields.title = value,
                        "description" => fields.description = value,
                        "category" => fields.category = value,
                        "price" => fields.price = value,
                        "instructor_name" => fields.instructor_name = value,
                        _ => {}
                    }
                }
            }
        }

        Ok(submission)
    }

    fn into_course(self) -> Result<NewCourse, (CourseFields, &'static str)> {
        let fields = self.fields;
        let missing = [
            &fields.title,
            &fields.description,
            &fields.category,
            &fields.instructor_name,
        ]
        .iter()
        .any(|v| v.trim().is_empty());
        if missing {
            return Err((fields, "Please fill in every field."));
        }

        if !COURSE_CATEGORIES.contains(&fields.category.trim()) {
            return Err((fields, "Please pick a category from the list."));
        }

        let Ok(price) = Price::parse(&fields.price) else {
            return Err((fields, "Please enter a valid price."));
        };

        Ok(NewCourse {
            title: fields.title.trim().to_string(),
            description: fields.description.trim().to_string(),
            category: fields.category.trim().to_string(),
            price,
            instructor_name: fields.instructor_name.trim().to_string(),
            course_image: self.course_image,
            curriculum_pdf: self.curriculum_pdf,
        })
    }
}

/// Handle the add course form.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin { visitor, token }: RequireAdmin,
    nonce: CspNonce,
    multipart: Multipart,
) -> Response {
    let submission = match Submission::read(multipart).await {
        Ok(submission) => submission,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read add course form");
            return Redirect::to("/admin/add-course?error=unavailable").into_response();
        }
    };

    let (fields, message) = match submission.into_course() {
        Ok(course) => {
            let fields = CourseFields {
                title: course.title.clone(),
                description: course.description.clone(),
                category: course.category.clone(),
                price: course.price.amount().to_string(),
                instructor_name: course.instructor_name.clone(),
            };
            match state.platform().add_course(&token, course).await {
                Ok(()) => {
                    tracing::info!(title = %fields.title, "Course added");
                    return Redirect::to("/admin/add-course?success=course_added").into_response();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to add course");
                    (fields, e.user_message().unwrap_or("Failed to add course").to_string())
                }
            }
        }
        Err((fields, message)) => (fields, message.to_string()),
    };

    AddCourseTemplate {
        page: Page::new(&state, &visitor, nonce).await.with_error(message),
        form: fields,
        categories: &COURSE_CATEGORIES,
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(price: &str) -> Submission {
        Submission {
            fields: CourseFields {
                title: " Rust for Backend ".to_string(),
                description: "Axum and Tokio".to_string(),
                category: "Web Development".to_string(),
                price: price.to_string(),
                instructor_name: "Ferris".to_string(),
            },
            course_image: None,
            curriculum_pdf: None,
        }
    }

    #[test]
    fn test_valid_submission() {
        let course = submission("2999").into_course();
        assert!(course.is_ok_and(|c| c.title == "Rust for Backend" && c.price.paise() == 299_900));
    }

    #[test]
    fn test_rejects_bad_price_and_keeps_fields() {
        let Err((fields, message)) = submission("free").into_course() else {
            panic!("expected an error");
        };
        assert_eq!(message, "Please enter a valid price.");
        assert_eq!(fields.instructor_name, "Ferris");
    }

    #[test]
    fn test_rejects_blank_fields() {
        let mut blank = submission("10");
        blank.fields.category = " ".to_string();
        assert!(blank.into_course().is_err());
    }

    #[test]
    fn test_category_must_come_from_course_list() {
        assert_eq!(COURSE_CATEGORIES.len(), 16);
        assert!(!COURSE_CATEGORIES.contains(&"Cybersecurity"));

        let mut other = submission("10");
        other.fields.category = "Machine Learning".to_string();
        let Err((_, message)) = other.into_course() else {
            panic!("expected an error");
        };
        assert_eq!(message, "Please pick a category from the list.");
    }
}
