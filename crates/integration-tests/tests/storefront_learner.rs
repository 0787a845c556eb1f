//! Cart badge, checkout and the learner forms.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use skillcoders_integration_tests::{INITIAL_CART, LEARNER_EMAIL, TestContext, location};

fn badge(count: i64) -> String {
    format!(r#"<span id="cart-count">{count}</span>"#)
}

#[tokio::test]
async fn test_add_to_cart_increments_badge_without_refetching_profile() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, LEARNER_EMAIL).await;

    let body = client
        .get(ctx.url("/dashboard"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains(&badge(INITIAL_CART)));

    let resp = client
        .post(ctx.url("/cart/add"))
        .header("hx-request", "true")
        .form(&[("course_id", "1")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("hx-trigger").and_then(|v| v.to_str().ok()),
        Some("cart-updated")
    );
    assert_eq!(resp.text().await.unwrap().trim(), (INITIAL_CART + 1).to_string());

    let body = client
        .get(ctx.url("/dashboard"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains(&badge(INITIAL_CART + 1)));

    assert_eq!(ctx.platform.count("POST /carting/cart/add"), 1);
    assert_eq!(ctx.platform.count("GET /auth/api/profile"), 1);
}

#[tokio::test]
async fn test_plain_form_cart_round_trip() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, LEARNER_EMAIL).await;

    let resp = client
        .post(ctx.url("/cart/add"))
        .form(&[("course_id", "2")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp).as_deref(), Some("/dashboard?success=cart_added"));

    let resp = client.get(ctx.url("/cartItems")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Cloud Computing"));
    assert!(body.contains(&badge(INITIAL_CART + 1)));

    let resp = client
        .post(ctx.url("/cart/remove"))
        .form(&[("course_id", "2")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp).as_deref(), Some("/cartItems?success=cart_removed"));

    let body = client
        .get(ctx.url("/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body.trim(), INITIAL_CART.to_string());
}

#[tokio::test]
async fn test_order_uses_catalogue_price() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, LEARNER_EMAIL).await;

    let resp = client
        .post(ctx.url("/api/payments/order"))
        .json(&json!({ "course_id": 2, "amount": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let options: Value = resp.json().await.unwrap();

    assert_eq!(options["amount"], 299_950);
    assert_eq!(options["currency"], "INR");
    assert_eq!(options["order_id"], "order_test_1");
    assert_eq!(options["key"], "rzp_test_key");
    assert_eq!(options["description"], "Payment for Cloud Computing");
    assert_eq!(options["prefill"]["name"], "asha");

    let sent = ctx.platform.last_body("/amount/create-order").unwrap();
    assert_eq!(sent["course_id"], 2);
    assert_eq!(sent["amount"], 2999.5);
}

#[tokio::test]
async fn test_order_for_unknown_course_is_404() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, LEARNER_EMAIL).await;

    let resp = client
        .post(ctx.url("/api/payments/order"))
        .json(&json!({ "course_id": 99 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(ctx.platform.count("POST /amount/create-order"), 0);
}

#[tokio::test]
async fn test_callback_request_from_landing() {
    let ctx = TestContext::start().await;
    let resp = ctx
        .client()
        .post(ctx.url("/callbacks"))
        .form(&[
            ("first_name", "Kiran"),
            ("last_name", "Rao"),
            ("phone_number", "9000000000"),
            ("mail_id", ""),
            ("comment", "Weekend batches?"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp).as_deref(), Some("/?success=callback"));

    let sent = ctx.platform.last_body("/support/callbacks").unwrap();
    assert_eq!(sent["firstName"], "Kiran");
    assert_eq!(sent["comment"], "Weekend batches?");
}

#[tokio::test]
async fn test_register_conflict_shows_platform_message() {
    let ctx = TestContext::start().await;
    let resp = ctx
        .client()
        .post(ctx.url("/register"))
        .form(&[
            ("name", "Asha"),
            ("email", LEARNER_EMAIL),
            ("password", "hunter22"),
            ("phone", "9876543210"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("User already exists"));
}

#[tokio::test]
async fn test_register_sends_prefixed_phone() {
    let ctx = TestContext::start().await;
    let resp = ctx
        .client()
        .post(ctx.url("/register"))
        .form(&[
            ("name", "Dev"),
            ("email", "dev@example.com"),
            ("password", "hunter22"),
            ("phone", "9111111111"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp).as_deref(), Some("/login?success=registered"));

    let sent = ctx.platform.last_body("/auth/api/register").unwrap();
    assert_eq!(sent["phone_number"], "+919111111111");
    assert_eq!(sent["mail_id"], "dev@example.com");
}

fn internship_form(year: &'static str) -> [(&'static str, &'static str); 7] {
    [
        ("name", "Asha"),
        ("mail_id", LEARNER_EMAIL),
        ("phone_number", "9876543210"),
        ("college", "IIT Madras"),
        ("year_of_passout", year),
        ("branch", "ECE"),
        ("domain", "DevOps"),
    ]
}

#[tokio::test]
async fn test_internship_year_is_sent_as_text() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, LEARNER_EMAIL).await;

    let resp = client
        .post(ctx.url("/internships"))
        .form(&internship_form("2027"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp).as_deref(), Some("/internships?success=internship"));

    let sent = ctx.platform.last_body("/intern/submit-internship/").unwrap();
    assert_eq!(sent["year_of_passout"], "2027");
    assert_eq!(sent["domain"], "DevOps");
}

#[tokio::test]
async fn test_unparseable_internship_year_shows_notice() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, LEARNER_EMAIL).await;

    let resp = client
        .post(ctx.url("/internships"))
        .form(&internship_form("soon"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.text()
            .await
            .unwrap()
            .contains("Please pick a year of passout from the list.")
    );
    assert!(ctx.platform.last_body("/intern/submit-internship/").is_none());
}
