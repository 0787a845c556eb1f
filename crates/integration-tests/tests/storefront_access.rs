//! Navigation guards, login landing and the identity probe.
//!
//! Each test starts its own fake platform and storefront; see
//! `skillcoders_integration_tests::TestContext`.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;

use skillcoders_integration_tests::{
    ADMIN_EMAIL, LEARNER_EMAIL, LEARNER_TOKEN, PASSWORD, TestContext, location,
};

const LOGIN_REQUIRED: &str = "/login?error=auth_required";

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::start().await;
    let client = ctx.client();

    let resp = client.get(ctx.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(ctx.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_session_cookie_only_after_login() {
    let ctx = TestContext::start().await;

    for path in ["/health", "/health/ready", "/static/css/main.css", "/", "/courses", "/login"] {
        let resp = reqwest::Client::new().get(ctx.url(path)).send().await.unwrap();
        assert!(resp.status().is_success(), "{path}");
        assert!(resp.headers().get("set-cookie").is_none(), "{path}");
    }

    let resp = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
        .post(ctx.url("/login"))
        .form(&[("email", LEARNER_EMAIL), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp).as_deref(), Some("/dashboard"));
    assert!(resp.headers().get("set-cookie").is_some());
}

#[tokio::test]
async fn test_anonymous_visitor_is_sent_to_login() {
    let ctx = TestContext::start().await;
    let client = ctx.client();

    for path in ["/dashboard", "/cartItems", "/internships", "/admin/dashboard", "/admin/callbacks"] {
        let resp = client.get(ctx.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp).as_deref(), Some(LOGIN_REQUIRED), "{path}");
    }

    let resp = client.get(ctx.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Request a callback"));

    let resp = client.get(ctx.url("/courses")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Full Stack Development"));
    assert!(body.contains("Login to enroll"));
}

#[tokio::test]
async fn test_payment_api_answers_401_when_logged_out() {
    let ctx = TestContext::start().await;
    let resp = ctx
        .client()
        .post(ctx.url("/api/payments/order"))
        .json(&serde_json::json!({ "course_id": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_learner_login_and_zones() {
    let ctx = TestContext::start().await;
    let client = ctx.client();

    assert_eq!(ctx.login(&client, LEARNER_EMAIL).await, "/dashboard");

    let resp = client.get(ctx.url("/")).send().await.unwrap();
    assert_eq!(location(&resp).as_deref(), Some("/dashboard"));

    let resp = client.get(ctx.url("/admin/dashboard")).send().await.unwrap();
    assert_eq!(location(&resp).as_deref(), Some("/dashboard"));

    let resp = client.get(ctx.url("/dashboard")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Available courses"));
    assert!(body.contains(r#"data-course-id="1""#));

    // Logging in does not need a probe
    assert_eq!(ctx.platform.count("GET /auth/api/user/me"), 0);
}

#[tokio::test]
async fn test_admin_login_lands_on_admin_dashboard() {
    let ctx = TestContext::start().await;
    let client = ctx.client();

    assert_eq!(ctx.login(&client, ADMIN_EMAIL).await, "/admin/dashboard");

    let resp = client.get(ctx.url("/dashboard")).send().await.unwrap();
    assert_eq!(location(&resp).as_deref(), Some("/admin/dashboard"));

    let resp = client.get(ctx.url("/admin/dashboard")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("₹1,25,000"));
    assert!(body.contains("Internship Forms"));
    // Profile summary in the navigation, but no cart badge.
    assert!(body.contains(r#"<div class="profile-summary">"#));
    assert!(body.contains("+919876543210"));
    assert!(!body.contains(r#"id="cart-count""#));
}

#[tokio::test]
async fn test_wrong_password_rerenders_login_with_platform_message() {
    let ctx = TestContext::start().await;
    let resp = ctx
        .client()
        .post(ctx.url("/login"))
        .form(&[("email", LEARNER_EMAIL), ("password", "nope")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Invalid email or password"));
    assert!(body.contains(LEARNER_EMAIL));
}

#[tokio::test]
async fn test_rejected_token_is_cleared_by_probe() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, LEARNER_EMAIL).await;

    ctx.platform.revoke(LEARNER_TOKEN);
    ctx.forget_visitors();

    let resp = client.get(ctx.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Request a callback"));

    let resp = client.get(ctx.url("/dashboard")).send().await.unwrap();
    assert_eq!(location(&resp).as_deref(), Some(LOGIN_REQUIRED));

    // Probed once; the cleared token is never sent again
    assert_eq!(ctx.platform.count("GET /auth/api/user/me"), 1);
}

#[tokio::test]
async fn test_accepted_token_survives_probe() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, ADMIN_EMAIL).await;
    ctx.forget_visitors();

    let resp = client.get(ctx.url("/")).send().await.unwrap();
    assert_eq!(location(&resp).as_deref(), Some("/admin/dashboard"));
    let resp = client.get(ctx.url("/admin/callbacks")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(ctx.platform.count("GET /auth/api/user/me"), 1);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, LEARNER_EMAIL).await;

    let resp = client.post(ctx.url("/logout")).send().await.unwrap();
    assert_eq!(location(&resp).as_deref(), Some("/login?success=logged_out"));
    assert_eq!(ctx.platform.count("POST /auth/api/logout"), 1);

    let resp = client.get(ctx.url("/dashboard")).send().await.unwrap();
    assert_eq!(location(&resp).as_deref(), Some(LOGIN_REQUIRED));
}

#[tokio::test]
async fn test_unknown_path_links_to_role_home() {
    let ctx = TestContext::start().await;
    let client = ctx.client();

    let resp = client.get(ctx.url("/no-such-page")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.text().await.unwrap().contains(r#"href="/">Return to Home"#));

    ctx.login(&client, LEARNER_EMAIL).await;
    let resp = client.get(ctx.url("/no-such-page")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.text().await.unwrap().contains(r#"href="/dashboard">Return to Home"#));
}

#[tokio::test]
async fn test_security_headers_carry_page_nonce() {
    let ctx = TestContext::start().await;
    let resp = ctx.client().get(ctx.url("/login")).send().await.unwrap();

    let policy = resp
        .headers()
        .get("content-security-policy")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let body = resp.text().await.unwrap();

    let nonce = policy
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .unwrap();
    assert!(body.contains(&format!(r#"nonce="{nonce}""#)));
}
