//! Integration test harness for the SkillCoders storefront.
//!
//! Each test gets its own fake platform API and its own storefront, both
//! bound to ephemeral local ports:
//!
//! ```rust,ignore
//! let ctx = TestContext::start().await;
//! let client = ctx.client();
//! ctx.login(&client, LEARNER_EMAIL).await;
//! let resp = client.get(ctx.url("/dashboard")).send().await?;
//! ```
//!
//! The fake platform knows two accounts, records every call it receives, and
//! can revoke tokens to simulate expiry on the platform side.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicI64, Ordering};

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use reqwest::{Client, redirect::Policy};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use skillcoders_storefront::config::StorefrontConfig;
use skillcoders_storefront::state::AppState;

pub const LEARNER_EMAIL: &str = "asha@example.com";
pub const LEARNER_TOKEN: &str = "learner-token";
pub const ADMIN_EMAIL: &str = "admin@skillcoders.in";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const PASSWORD: &str = "correct-horse";

/// Cart count the fake profile starts with.
pub const INITIAL_CART: i64 = 2;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Fake platform API
// =============================================================================

/// Everything the fake platform remembers.
#[derive(Debug, Default)]
pub struct PlatformLog {
    calls: Mutex<Vec<String>>,
    revoked: Mutex<HashSet<String>>,
    bodies: Mutex<Vec<(String, Value)>>,
    cart: AtomicI64,
}

impl PlatformLog {
    /// Number of calls received as `"METHOD /path"`.
    pub fn count(&self, call: &str) -> usize {
        lock(&self.calls).iter().filter(|c| *c == call).count()
    }

    /// Last JSON body posted to `path`.
    pub fn last_body(&self, path: &str) -> Option<Value> {
        lock(&self.bodies)
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
    }

    /// Make the platform reject `token` from now on.
    pub fn revoke(&self, token: &str) {
        lock(&self.revoked).insert(token.to_string());
    }

    fn record_body(&self, path: &str, body: Value) {
        lock(&self.bodies).push((path.to_string(), body));
    }

    fn is_live(&self, token: &str) -> bool {
        (token == LEARNER_TOKEN || token == ADMIN_TOKEN) && !lock(&self.revoked).contains(token)
    }
}

type Log = Arc<PlatformLog>;

async fn record(State(log): State<Log>, request: Request, next: Next) -> Response {
    lock(&log.calls).push(format!("{} {}", request.method(), request.uri().path()));
    next.run(request).await
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Unauthorized" })),
    )
        .into_response()
}

/// Run `ok` if the request carries a live token, 401 otherwise.
fn authed(log: &PlatformLog, headers: &HeaderMap, ok: impl FnOnce(&str) -> Response) -> Response {
    match bearer(headers) {
        Some(token) if log.is_live(token) => ok(token),
        _ => unauthorized(),
    }
}

fn catalogue() -> Value {
    json!([
        {
            "id": 1,
            "course_name": "Full Stack Development",
            "instructor_name": "Meera",
            "price": 4999,
            "category": "Web Development",
            "curriculum_pdf": "uploads/full-stack.pdf"
        },
        {
            "id": 2,
            "course_name": "Cloud Computing",
            "instructor_name": "Ravi",
            "price": 2999.5,
            "category": "Cloud Computing"
        }
    ])
}

async fn login(State(log): State<Log>, Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid email or password" })),
        )
            .into_response();
    }
    let reply = match body["mail_id"].as_str() {
        Some(LEARNER_EMAIL) => json!({ "token": LEARNER_TOKEN, "username": "asha", "admin": false }),
        Some(ADMIN_EMAIL) => json!({ "token": ADMIN_TOKEN, "username": "admin", "admin": true }),
        _ => return (StatusCode::NOT_FOUND, Json(json!({ "message": "User not found" }))).into_response(),
    };
    log.record_body("/auth/api/login", body);
    Json(reply).into_response()
}

async fn register(State(log): State<Log>, Json(body): Json<Value>) -> Response {
    if body["mail_id"] == LEARNER_EMAIL {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "User already exists" })),
        )
            .into_response();
    }
    log.record_body("/auth/api/register", body);
    StatusCode::CREATED.into_response()
}

async fn identity(State(log): State<Log>, headers: HeaderMap) -> Response {
    authed(&log, &headers, |token| {
        Json(json!({ "admin": token == ADMIN_TOKEN })).into_response()
    })
}

async fn profile(State(log): State<Log>, headers: HeaderMap) -> Response {
    let cart = log.cart.load(Ordering::SeqCst);
    authed(&log, &headers, |_| {
        Json(json!({
            "name": "Asha",
            "mail_id": LEARNER_EMAIL,
            "phone_number": "+919876543210",
            "total_cart_count": cart
        }))
        .into_response()
    })
}

async fn ok_if_authed(State(log): State<Log>, headers: HeaderMap) -> Response {
    authed(&log, &headers, |_| StatusCode::OK.into_response())
}

async fn courses() -> Json<Value> {
    Json(catalogue())
}

async fn available(State(log): State<Log>, headers: HeaderMap) -> Response {
    authed(&log, &headers, |_| Json(catalogue()).into_response())
}

async fn registered(State(log): State<Log>, headers: HeaderMap) -> Response {
    authed(&log, &headers, |_| Json(json!([])).into_response())
}

async fn cart(State(log): State<Log>, headers: HeaderMap) -> Response {
    authed(&log, &headers, |_| {
        Json(json!({ "cart_items": [catalogue()[1].clone()] })).into_response()
    })
}

async fn cart_add(State(log): State<Log>, headers: HeaderMap) -> Response {
    authed(&log, &headers, |_| {
        log.cart.fetch_add(1, Ordering::SeqCst);
        StatusCode::OK.into_response()
    })
}

async fn cart_remove(State(log): State<Log>, headers: HeaderMap) -> Response {
    authed(&log, &headers, |_| {
        log.cart.fetch_sub(1, Ordering::SeqCst);
        StatusCode::OK.into_response()
    })
}

async fn create_order(State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let amount = body["amount"].clone();
    let reply = authed(&log, &headers, |_| {
        Json(json!({ "orderId": "order_test_1", "key": "rzp_test_key", "amount": amount }))
            .into_response()
    });
    log.record_body("/amount/create-order", body);
    reply
}

async fn callbacks_submit(State(log): State<Log>, Json(body): Json<Value>) -> StatusCode {
    log.record_body("/support/callbacks", body);
    StatusCode::CREATED
}

async fn callbacks(State(log): State<Log>, headers: HeaderMap) -> Response {
    authed(&log, &headers, |token| {
        if token != ADMIN_TOKEN {
            return StatusCode::FORBIDDEN.into_response();
        }
        Json(json!({ "data": [{
            "id": 11,
            "first_name": "Kiran",
            "last_name": "Rao",
            "phone_number": "9000000000",
            "comment": "Weekend batches?",
            "status": "Pending"
        }] }))
        .into_response()
    })
}

async fn complete_callback(State(log): State<Log>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    authed(&log, &headers, |_| {
        log.record_body("/support/callbacks/{id}", json!({ "id": id }));
        StatusCode::OK.into_response()
    })
}

async fn admin_stats(State(log): State<Log>, headers: HeaderMap) -> Response {
    authed(&log, &headers, |_| {
        Json(json!({
            "total_courses": 2,
            "total_registrations": 40,
            "active_users": 31,
            "total_revenue": 125_000
        }))
        .into_response()
    })
}

async fn empty_list(State(log): State<Log>, headers: HeaderMap) -> Response {
    authed(&log, &headers, |_| Json(json!([])).into_response())
}

async fn internship_forms(State(log): State<Log>, headers: HeaderMap) -> Response {
    authed(&log, &headers, |_| {
        Json(json!([{
            "id": 7,
            "name": "Dev Patel",
            "email": "dev@example.com",
            "phone_number": "9111111111",
            "college": "NIT Trichy",
            "domain": "DevOps",
            "year_of_passout": "2026",
            "branch": "ECE"
        }, {
            "id": 9,
            "name": "Nila Iyer",
            "email": "nila@example.com",
            "phone_number": "9222222222",
            "college": "PSG Tech",
            "domain": "Cybersecurity",
            "year_of_passout": "2025",
            "branch": "CSE",
            "status": "Rejected"
        }, {
            "id": 10,
            "name": "Omar Khan",
            "email": "omar@example.com",
            "phone_number": "9333333333",
            "college": "VIT",
            "domain": "Cloud Computing",
            "year_of_passout": "2025",
            "status": "complete"
        }]))
        .into_response()
    })
}

async fn submit_internship(State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let reply = authed(&log, &headers, |_| StatusCode::CREATED.into_response());
    log.record_body("/intern/submit-internship/", body);
    reply
}

async fn approve(State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let reply = authed(&log, &headers, |_| StatusCode::OK.into_response());
    log.record_body("/auth/api/approve-internship", body);
    reply
}

fn platform_router(log: Log) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/auth/api/login", post(login))
        .route("/auth/api/register", post(register))
        .route("/auth/api/user/me", get(identity))
        .route("/auth/api/profile", get(profile))
        .route("/auth/api/logout", post(ok_if_authed))
        .route("/auth/api/dashboard", get(admin_stats))
        .route("/auth/api/monthly-revenue", get(empty_list))
        .route("/auth/api/courses-by-category", get(empty_list))
        .route("/auth/api/approve-internship", post(approve))
        .route("/admin/courses", get(courses))
        .route("/admin/registered-courses", get(registered))
        .route("/admin/non-registered-courses", get(available))
        .route("/carting/cart", get(cart))
        .route("/carting/cart/add", post(cart_add))
        .route("/carting/cart/remove", delete(cart_remove))
        .route("/amount/create-order", post(create_order))
        .route("/amount/verify-payment", post(ok_if_authed))
        .route("/support/callbacks", post(callbacks_submit))
        .route("/support/callbacks/{id}", patch(complete_callback))
        .route("/support/get/callbacks", get(callbacks))
        .route("/intern/internship-forms", get(internship_forms))
        .route("/intern/submit-internship/", post(submit_internship))
        .layer(from_fn_with_state(Arc::clone(&log), record))
        .with_state(log)
}

// =============================================================================
// Test context
// =============================================================================

/// A storefront wired to a fake platform.
pub struct TestContext {
    pub base_url: String,
    pub state: AppState,
    pub platform: Arc<PlatformLog>,
}

impl TestContext {
    /// Start a fake platform and a storefront in front of it.
    pub async fn start() -> Self {
        let platform = Arc::new(PlatformLog::default());
        platform.cart.store(INITIAL_CART, Ordering::SeqCst);

        let platform_listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake platform");
        let platform_addr = platform_listener
            .local_addr()
            .expect("Fake platform has no address");
        let router = platform_router(Arc::clone(&platform));
        tokio::spawn(async move {
            axum::serve(platform_listener, router)
                .await
                .expect("Fake platform stopped");
        });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront");
        let addr = listener.local_addr().expect("Storefront has no address");
        let base_url = format!("http://{addr}");
        let platform_url = format!("http://{platform_addr}");

        let config = StorefrontConfig::from_lookup(|key| match key {
            "STOREFRONT_BASE_URL" => Some(base_url.clone()),
            "PLATFORM_API_URL" => Some(platform_url.clone()),
            _ => None,
        })
        .expect("Invalid test configuration");
        let state = AppState::new(config).expect("Failed to build app state");

        let app = skillcoders_storefront::app(state.clone());
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Storefront stopped");
        });

        Self {
            base_url,
            state,
            platform,
        }
    }

    /// Absolute URL for `path` on the storefront.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A browser-like client: keeps cookies, does not follow redirects.
    pub fn client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Log `client` in as `email` and return where the storefront sent it.
    pub async fn login(&self, client: &Client, email: &str) -> String {
        let resp = client
            .post(self.url("/login"))
            .form(&[("email", email), ("password", PASSWORD)])
            .send()
            .await
            .expect("Login request failed");
        location(&resp).unwrap_or_default()
    }

    /// Forget all in-process visitor state, as a restart would, while the
    /// client keeps its session cookie.
    pub fn forget_visitors(&self) {
        self.state.visitors().clear();
    }
}

/// The `Location` header of a redirect, if any.
pub fn location(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
