//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page (logged-in visitors are sent home)
//! POST /callbacks              - Callback request form
//! GET  /courses                - Public course catalogue
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /register               - Register page
//! POST /register               - Register action
//! POST /logout                 - Logout action (any session)
//!
//! # Learner (user-only)
//! GET  /dashboard              - Registered and available courses
//! GET  /cartItems              - Cart page
//! POST /cart/add               - Add to cart (badge +1)
//! POST /cart/remove            - Remove from cart (badge -1)
//! GET  /cart/count             - Cart count badge (fragment)
//! GET  /internships            - Internship application form
//! POST /internships            - Submit application
//! POST /api/payments/order     - Create payment order, returns widget options (JSON)
//! POST /api/payments/verify    - Verify widget response (JSON)
//!
//! # Admin (admin-only)
//! GET  /admin/dashboard                      - Stats, monthly revenue, categories
//! GET  /admin/add-course                     - Add course form
//! POST /admin/add-course                     - Add course (multipart)
//! GET  /admin/callbacks                      - Callback requests
//! POST /admin/callbacks/{id}/complete        - Mark callback completed
//! GET  /admin/internship-forms               - Internship applications
//! POST /admin/internship-forms/{id}/select   - Select applicant
//!
//! # Anything else
//! *                            - 404 with a role-aware home link
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod courses;
pub mod dashboard;
pub mod home;
pub mod internships;
pub mod not_found;
pub mod page;
pub mod payments;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::middleware::{RateLimiterLayer, auth_rate_limiter, form_rate_limiter};
use crate::state::AppState;

fn limited(router: Router<AppState>, limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    match limiter {
        Some(layer) => router.layer(layer),
        None => {
            tracing::error!("Rate limiter configuration rejected; routes are unlimited");
            router
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let forms = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register));

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .merge(limited(forms, auth_rate_limiter()))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the payment API routes router.
pub fn payment_routes() -> Router<AppState> {
    limited(
        Router::new()
            .route("/order", post(payments::create_order))
            .route("/verify", post(payments::verify)),
        form_rate_limiter(),
    )
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard::show))
        .route(
            "/add-course",
            get(admin::courses::show)
                .post(admin::courses::create)
                .layer(DefaultBodyLimit::max(admin::courses::MAX_UPLOAD_BYTES)),
        )
        .route("/callbacks", get(admin::callbacks::index))
        .route(
            "/callbacks/{id}/complete",
            post(admin::callbacks::complete),
        )
        .route("/internship-forms", get(admin::internships::index))
        .route(
            "/internship-forms/{id}/select",
            post(admin::internships::select),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::landing))
        .merge(limited(
            Router::new().route("/callbacks", post(home::request_callback)),
            form_rate_limiter(),
        ))
        .route("/courses", get(courses::index))
        .merge(auth_routes())
        .route("/dashboard", get(dashboard::show))
        .route("/cartItems", get(cart::show))
        .nest("/cart", cart_routes())
        .route(
            "/internships",
            get(internships::show).post(internships::submit),
        )
        .nest("/api/payments", payment_routes())
        .nest("/admin", admin_routes())
}
