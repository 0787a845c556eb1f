//! Public course catalogue.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use skillcoders_core::CourseId;

use crate::filters;
use crate::middleware::{CspNonce, Visitor};
use crate::platform::{Course, PlatformClient};
use crate::routes::page::{MessageQuery, Page};
use crate::state::AppState;

/// Course display data for templates.
#[derive(Debug, Clone)]
pub struct CourseCard {
    pub id: Option<CourseId>,
    pub name: String,
    pub image: Option<String>,
    pub instructor: String,
    pub price: String,
    pub description: String,
    pub category: String,
    pub curriculum_url: Option<String>,
}

impl CourseCard {
    #[must_use]
    pub fn new(platform: &PlatformClient, course: &Course) -> Self {
        Self {
            id: course.key(),
            name: course.course_name.clone(),
            image: course.course_image.clone().filter(|url| !url.is_empty()),
            instructor: course.instructor_name.clone(),
            price: course.price.to_string(),
            description: course.description.clone().unwrap_or_default(),
            category: course.category.clone().unwrap_or_default(),
            curriculum_url: platform.curriculum_url(course),
        }
    }

    /// Cards for a list of courses.
    #[must_use]
    pub fn list(platform: &PlatformClient, courses: &[Course]) -> Vec<Self> {
        courses.iter().map(|c| Self::new(platform, c)).collect()
    }
}

/// Course catalogue template.
#[derive(Template, WebTemplate)]
#[template(path = "courses/index.html")]
pub struct CoursesTemplate {
    pub page: Page,
    pub courses: Vec<CourseCard>,
}

/// Display the course catalogue.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    visitor: Visitor,
    nonce: CspNonce,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let mut page = Page::new(&state, &visitor, nonce).await.with_query(&query);

    let courses = match state.platform().courses().await {
        Ok(courses) => CourseCard::list(state.platform(), &courses),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load course catalogue");
            page = page.with_error("Failed to load courses. Please try again.");
            Vec::new()
        }
    };

    CoursesTemplate { page, courses }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;

    use super::*;
    use crate::config::PlatformConfig;

    #[test]
    fn test_course_card_fields() {
        let platform =
            PlatformClient::new(&PlatformConfig::new(Url::parse("http://localhost:5000").unwrap()))
                .unwrap();
        let course: Course = serde_json::from_value(serde_json::json!({
            "id": 3,
            "course_name": "Rust Basics",
            "course_image": "",
            "curriculum_pdf": "uploads/rust.pdf",
            "instructor_name": "Ferris",
            "price": "499.00",
        }))
        .unwrap();

        let card = CourseCard::new(&platform, &course);
        assert_eq!(card.id, Some(CourseId::new(3)));
        assert_eq!(card.image, None);
        assert_eq!(card.price, "₹499");
        assert_eq!(
            card.curriculum_url.as_deref(),
            Some("http://localhost:5000/download-curriculum/rust.pdf?courseName=Rust+Basics")
        );
    }
}
