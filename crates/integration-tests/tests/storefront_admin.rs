//! Admin console actions.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;

use skillcoders_integration_tests::{ADMIN_EMAIL, TestContext, location};

#[tokio::test]
async fn test_callbacks_list_and_complete() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, ADMIN_EMAIL).await;

    let resp = client.get(ctx.url("/admin/callbacks")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Kiran Rao"));
    assert!(body.contains(r#"action="/admin/callbacks/11/complete""#));

    let resp = client
        .post(ctx.url("/admin/callbacks/11/complete"))
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&resp).as_deref(),
        Some("/admin/callbacks?success=callback_completed")
    );
    assert_eq!(ctx.platform.count("PATCH /support/callbacks/11"), 1);
}

#[tokio::test]
async fn test_select_applicant_sends_platform_record() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, ADMIN_EMAIL).await;

    let resp = client
        .post(ctx.url("/admin/internship-forms/7/select"))
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&resp).as_deref(),
        Some("/admin/internship-forms?success=applicant_selected")
    );

    let sent = ctx.platform.last_body("/auth/api/approve-internship").unwrap();
    assert_eq!(sent["id"], 7);
    // Unreviewed rows carry no status of their own.
    assert!(sent.get("status").is_none());
    assert_eq!(sent["applicant_email"], "dev@example.com");
    assert_eq!(sent["applicant_name"], "Dev Patel");
}

#[tokio::test]
async fn test_select_unknown_applicant() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, ADMIN_EMAIL).await;

    let resp = client
        .post(ctx.url("/admin/internship-forms/8/select"))
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&resp).as_deref(),
        Some("/admin/internship-forms?error=not_found")
    );
    assert!(ctx.platform.last_body("/auth/api/approve-internship").is_none());
}

#[tokio::test]
async fn test_internship_forms_page() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, ADMIN_EMAIL).await;

    let resp = client
        .get(ctx.url("/admin/internship-forms"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("NIT Trichy"));
    assert!(body.contains("Pending"));

    // Only the already selected row has its button disabled.
    assert_eq!(body.matches(" disabled>Mark Complete").count(), 1);
    let selected = body.find("/admin/internship-forms/10/select").unwrap();
    assert!(body[selected..].contains(" disabled>Mark Complete"));
    let rejected = body.find("/admin/internship-forms/9/select").unwrap();
    assert!(!body[rejected..selected].contains("disabled"));
}

#[tokio::test]
async fn test_rejected_applicant_can_still_be_selected() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, ADMIN_EMAIL).await;

    let resp = client
        .post(ctx.url("/admin/internship-forms/9/select"))
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&resp).as_deref(),
        Some("/admin/internship-forms?success=applicant_selected")
    );

    let sent = ctx.platform.last_body("/auth/api/approve-internship").unwrap();
    assert_eq!(sent["id"], 9);
    assert_eq!(sent["status"], "Rejected");
    assert_eq!(sent["applicant_name"], "Nila Iyer");
}

#[tokio::test]
async fn test_add_course_form_lists_categories() {
    let ctx = TestContext::start().await;
    let client = ctx.client();
    ctx.login(&client, ADMIN_EMAIL).await;

    let resp = client.get(ctx.url("/admin/add-course")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains(r#"enctype="multipart/form-data""#));
    assert!(body.contains("Full Stack Development"));
    assert!(!body.contains("Cybersecurity"));
}
