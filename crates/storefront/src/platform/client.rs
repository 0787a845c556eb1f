//! Platform API client implementation.
//!
//! Plain JSON over `reqwest` 0.13. Only the public course catalogue is
//! cached; everything scoped to a visitor goes straight to the API.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, multipart};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use skillcoders_core::{CallbackId, CourseId};

use crate::config::PlatformConfig;

use super::PlatformError;
use super::types::{
    ApproveInternshipRequest, CallbackList, CallbackRequest, CallbackSubmission, CartItemRequest,
    CartItems, CategoryCount, Course, CreateOrderRequest, DashboardStats, ErrorBody, Identity,
    InternshipApplication, InternshipForm, LoginRequest, LoginResponse, MonthlyRevenue, NewCourse,
    PaymentOrder, PaymentVerification, Profile, Registration, Upload,
};

/// How much of an unexpected body is logged.
const LOG_BODY_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CatalogueKey {
    AllCourses,
}

// =============================================================================
// PlatformClient
// =============================================================================

/// Client for the course platform API.
///
/// Cheap to clone; clones share the connection pool and the catalogue cache.
#[derive(Clone)]
pub struct PlatformClient {
    inner: Arc<PlatformClientInner>,
}

struct PlatformClientInner {
    client: reqwest::Client,
    base_url: Url,
    catalogue: Cache<CatalogueKey, Vec<Course>>,
}

impl PlatformClient {
    /// Create a new platform client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &PlatformConfig) -> Result<Self, PlatformError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;

        let catalogue = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.catalogue_ttl)
            .build();

        // Paths are joined relative to the base, so it must end in a slash
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(PlatformClientInner {
                client,
                base_url,
                catalogue,
            }),
        })
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, PlatformError> {
        let url = self.inner.base_url.join(path)?;
        Ok(self.inner.client.request(method, url))
    }

    fn authed(
        &self,
        method: Method,
        path: &str,
        token: &SecretString,
    ) -> Result<RequestBuilder, PlatformError> {
        Ok(self.request(method, path)?.bearer_auth(token.expose_secret()))
    }

    /// Send a request and turn non-success statuses into errors.
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, PlatformError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);

        debug!(
            status = %status,
            body = %body.chars().take(LOG_BODY_CHARS).collect::<String>(),
            "Platform returned non-success status"
        );

        Err(PlatformError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Send a request and decode its JSON body.
    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, PlatformError> {
        let response = self.send(request).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %body.chars().take(LOG_BODY_CHARS).collect::<String>(),
                "Failed to parse platform response"
            );
            PlatformError::Parse(e)
        })
    }

    /// Send a request whose body is irrelevant on success.
    async fn execute(&self, request: RequestBuilder) -> Result<(), PlatformError> {
        self.send(request).await.map(drop)
    }

    /// Whether the platform answers at all.
    pub async fn is_reachable(&self) -> bool {
        self.inner
            .client
            .get(self.inner.base_url.clone())
            .send()
            .await
            .is_ok()
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Ask the platform who owns `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn identity(&self, token: &SecretString) -> Result<Identity, PlatformError> {
        self.json(self.authed(Method::GET, "auth/api/user/me", token)?)
            .await
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, mail_id: &str, password: &str) -> Result<LoginResponse, PlatformError> {
        let body = LoginRequest { mail_id, password };
        self.json(self.request(Method::POST, "auth/api/login")?.json(&body))
            .await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses the registration.
    #[instrument(skip_all, fields(mail_id = %registration.mail_id))]
    pub async fn register(&self, registration: &Registration) -> Result<(), PlatformError> {
        self.execute(
            self.request(Method::POST, "auth/api/register")?
                .json(registration),
        )
        .await
    }

    /// Fetch the visitor's profile, including the cart count.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn profile(&self, token: &SecretString) -> Result<Profile, PlatformError> {
        self.json(self.authed(Method::GET, "auth/api/profile", token)?)
            .await
    }

    /// End the platform-side session for `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: &SecretString) -> Result<(), PlatformError> {
        self.execute(self.authed(Method::POST, "auth/api/logout", token)?)
            .await
    }

    // =========================================================================
    // Courses
    // =========================================================================

    /// The public course catalogue. Cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn courses(&self) -> Result<Vec<Course>, PlatformError> {
        if let Some(courses) = self.inner.catalogue.get(&CatalogueKey::AllCourses).await {
            debug!("Cache hit for course catalogue");
            return Ok(courses);
        }

        let courses: Vec<Course> = self
            .json(self.request(Method::GET, "admin/courses")?)
            .await?;

        self.inner
            .catalogue
            .insert(CatalogueKey::AllCourses, courses.clone())
            .await;

        Ok(courses)
    }

    /// Courses the visitor has paid for.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn registered_courses(&self, token: &SecretString) -> Result<Vec<Course>, PlatformError> {
        self.json(self.authed(Method::GET, "admin/registered-courses", token)?)
            .await
    }

    /// Courses the visitor can still register for.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn available_courses(&self, token: &SecretString) -> Result<Vec<Course>, PlatformError> {
        self.json(self.authed(Method::GET, "admin/non-registered-courses", token)?)
            .await
    }

    /// Link to a course's curriculum PDF.
    ///
    /// Downloads are served by the platform directly, not proxied.
    #[must_use]
    pub fn curriculum_url(&self, course: &Course) -> Option<String> {
        let file = course.curriculum_file()?;
        let mut url = self
            .inner
            .base_url
            .join("download-curriculum/")
            .and_then(|u| u.join(&urlencoding::encode(file)))
            .ok()?;
        url.query_pairs_mut()
            .append_pair("courseName", &course.course_name);
        Some(url.into())
    }

    // =========================================================================
    // Cart (not cached - mutable state)
    // =========================================================================

    /// Items in the visitor's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn cart_items(&self, token: &SecretString) -> Result<Vec<Course>, PlatformError> {
        let items: CartItems = self
            .json(self.authed(Method::GET, "carting/cart", token)?)
            .await?;
        Ok(items.cart_items)
    }

    /// Add a course to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses or the request fails.
    #[instrument(skip(self, token))]
    pub async fn add_to_cart(&self, token: &SecretString, course_id: CourseId) -> Result<(), PlatformError> {
        self.execute(
            self.authed(Method::POST, "carting/cart/add", token)?
                .json(&CartItemRequest { course_id }),
        )
        .await
    }

    /// Remove a course from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses or the request fails.
    #[instrument(skip(self, token))]
    pub async fn remove_from_cart(
        &self,
        token: &SecretString,
        course_id: CourseId,
    ) -> Result<(), PlatformError> {
        self.execute(
            self.authed(Method::DELETE, "carting/cart/remove", token)?
                .json(&CartItemRequest { course_id }),
        )
        .await
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Create a payment order for a course.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses or the request fails.
    #[instrument(skip(self, token))]
    pub async fn create_order(
        &self,
        token: &SecretString,
        course_id: CourseId,
        amount: skillcoders_core::Price,
    ) -> Result<PaymentOrder, PlatformError> {
        self.json(
            self.authed(Method::POST, "amount/create-order", token)?
                .json(&CreateOrderRequest { course_id, amount }),
        )
        .await
    }

    /// Forward the checkout widget's response for signature verification.
    ///
    /// # Errors
    ///
    /// Returns an error if verification fails or the request fails.
    #[instrument(skip_all, fields(course_id = %verification.course_id, order_id = %verification.order_id))]
    pub async fn verify_payment(
        &self,
        token: &SecretString,
        verification: &PaymentVerification,
    ) -> Result<(), PlatformError> {
        self.execute(
            self.authed(Method::POST, "amount/verify-payment", token)?
                .json(verification),
        )
        .await
    }

    // =========================================================================
    // Support and internships
    // =========================================================================

    /// Record a callback request from the landing page.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses or the request fails.
    #[instrument(skip_all)]
    pub async fn submit_callback(&self, submission: &CallbackSubmission) -> Result<(), PlatformError> {
        self.execute(
            self.request(Method::POST, "support/callbacks")?
                .json(submission),
        )
        .await
    }

    /// Submit an internship application.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses or the request fails.
    #[instrument(skip_all, fields(domain = %application.domain))]
    pub async fn submit_internship(
        &self,
        token: &SecretString,
        application: &InternshipApplication,
    ) -> Result<(), PlatformError> {
        self.execute(
            self.authed(Method::POST, "intern/submit-internship/", token)?
                .json(application),
        )
        .await
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Create a course. Clears the cached catalogue on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses or the request fails.
    #[instrument(skip_all, fields(title = %course.title))]
    pub async fn add_course(&self, token: &SecretString, course: NewCourse) -> Result<(), PlatformError> {
        let mut form = multipart::Form::new()
            .text("title", course.title)
            .text("description", course.description)
            .text("category", course.category)
            .text("price", course.price.amount().to_string())
            .text("instructor_name", course.instructor_name);

        if let Some(upload) = course.course_image {
            form = form.part("course_image", upload_part(upload)?);
        }
        if let Some(upload) = course.curriculum_pdf {
            form = form.part("curriculum_pdf", upload_part(upload)?);
        }

        self.execute(
            self.authed(Method::POST, "admin/add-course", token)?
                .multipart(form),
        )
        .await?;

        self.inner.catalogue.invalidate_all();
        Ok(())
    }

    /// Headline numbers for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn dashboard_stats(&self, token: &SecretString) -> Result<DashboardStats, PlatformError> {
        self.json(self.authed(Method::GET, "auth/api/dashboard", token)?)
            .await
    }

    /// Revenue per month.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn monthly_revenue(&self, token: &SecretString) -> Result<Vec<MonthlyRevenue>, PlatformError> {
        self.json(self.authed(Method::GET, "auth/api/monthly-revenue", token)?)
            .await
    }

    /// Course count per category.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn courses_by_category(
        &self,
        token: &SecretString,
    ) -> Result<Vec<CategoryCount>, PlatformError> {
        self.json(self.authed(Method::GET, "auth/api/courses-by-category", token)?)
            .await
    }

    /// All callback requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn callbacks(&self, token: &SecretString) -> Result<Vec<CallbackRequest>, PlatformError> {
        let list: CallbackList = self
            .json(self.authed(Method::GET, "support/get/callbacks", token)?)
            .await?;
        Ok(list.data)
    }

    /// Mark a callback request as completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses or the request fails.
    #[instrument(skip(self, token))]
    pub async fn complete_callback(&self, token: &SecretString, id: CallbackId) -> Result<(), PlatformError> {
        self.execute(self.authed(Method::PATCH, &format!("support/callbacks/{id}"), token)?)
            .await
    }

    /// All internship applications.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn internship_forms(&self, token: &SecretString) -> Result<Vec<InternshipForm>, PlatformError> {
        self.json(self.authed(Method::GET, "intern/internship-forms", token)?)
            .await
    }

    /// Select an applicant. The platform notifies them by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses or the request fails.
    #[instrument(skip_all, fields(id = %form.id))]
    pub async fn select_applicant(&self, token: &SecretString, form: &InternshipForm) -> Result<(), PlatformError> {
        let body = ApproveInternshipRequest {
            applicant_email: &form.email,
            applicant_name: &form.name,
            id: form.id,
            status: form.status,
        };
        self.execute(
            self.authed(Method::POST, "auth/api/approve-internship", token)?
                .json(&body),
        )
        .await
    }
}

fn upload_part(upload: Upload) -> Result<multipart::Part, PlatformError> {
    let part = multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
    match upload.content_type {
        Some(content_type) => Ok(part.mime_str(&content_type)?),
        None => Ok(part),
    }
}
