//! HTTP-level tests for registration, code verification and login.

mod common;

use axum::http::StatusCode;
use common::{TestApp, PASSWORD};
use serde_json::json;

const EMAIL: &str = "dave@example.com";

async fn register(app: &TestApp) -> (StatusCode, serde_json::Value) {
    app.post(
        "/api/v1/auth/register",
        None,
        json!({ "username": "dave", "email": EMAIL, "password": PASSWORD }),
    )
    .await
}

async fn issued_code(app: &TestApp) -> String {
    app.notifier
        .last_code(EMAIL)
        .await
        .expect("a verification code was sent")
}

fn wrong_code(code: &str) -> &'static str {
    if code == "000000" {
        "111111"
    } else {
        "000000"
    }
}

async fn verify(app: &TestApp, code: &str) -> (StatusCode, serde_json::Value) {
    app.post(
        "/api/v1/auth/verify-code",
        None,
        json!({ "email": EMAIL, "code": code }),
    )
    .await
}

#[tokio::test]
async fn register_creates_unverified_account_and_sends_code() {
    let app = TestApp::new().await;

    let (status, body) = register(&app).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["username"], "dave");
    assert_eq!(body["data"]["is_verified"], false);
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(issued_code(&app).await.len(), 6);
}

#[tokio::test]
async fn register_rejects_taken_username() {
    let app = TestApp::new().await;
    register(&app).await;

    let (status, body) = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "username": "dave", "email": "other@example.com", "password": PASSWORD }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_NAME");
}

#[tokio::test]
async fn register_rejects_short_password() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "username": "dave", "email": EMAIL, "password": "abc" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn register_succeeds_when_code_cannot_be_sent() {
    let app = TestApp::new().await;
    app.notifier.fail_sends(true);

    let (status, _) = register(&app).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(app.notifier.sent().await.is_empty());
}

#[tokio::test]
async fn unverified_account_cannot_log_in() {
    let app = TestApp::new().await;
    register(&app).await;

    let (status, body) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": "dave", "password": PASSWORD }),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "UNVERIFIED_ACCOUNT");
}

#[tokio::test]
async fn verified_account_logs_in_with_capabilities() {
    let app = TestApp::new().await;
    register(&app).await;
    let code = issued_code(&app).await;

    let (status, _) = verify(&app, &code).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": "dave", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["expires_in"], 3600);
    assert_eq!(body["principal"]["role"], "user");
    assert_eq!(body["principal"]["capabilities"]["can_access_admin"], false);
}

#[tokio::test]
async fn wrong_code_reports_remaining_attempts() {
    let app = TestApp::new().await;
    register(&app).await;
    let code = issued_code(&app).await;

    let (status, body) = verify(&app, wrong_code(&code)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_CODE");
    assert_eq!(body["remaining_attempts"], 4);
}

#[tokio::test]
async fn fifth_failure_locks_until_resend() {
    let app = TestApp::new().await;
    register(&app).await;
    let code = issued_code(&app).await;

    for expected in (0..5).rev() {
        let (_, body) = verify(&app, wrong_code(&code)).await;
        assert_eq!(body["remaining_attempts"], expected);
    }

    // Even the right code is refused once the budget is spent.
    let (status, body) = verify(&app, &code).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "ATTEMPTS_EXCEEDED");

    let (status, _) = app
        .post("/api/v1/auth/resend-code", None, json!({ "email": EMAIL }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let fresh = issued_code(&app).await;
    let (status, _) = verify(&app, &fresh).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn verifying_twice_is_rejected() {
    let app = TestApp::new().await;
    register(&app).await;
    let code = issued_code(&app).await;
    verify(&app, &code).await;

    let (status, body) = verify(&app, &code).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST_STATE");
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let app = TestApp::new().await;
    app.seed("erin", "user").await;

    let (wrong_password, _) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": "erin", "password": "not-the-password" }),
        )
        .await;
    let (unknown_user, body) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": "nobody", "password": PASSWORD }),
        )
        .await;

    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn unverified_admin_may_still_log_in() {
    let app = TestApp::new().await;
    a4l_core::testing::seed_account(&app.store, "boss", PASSWORD, "admin", false).await;

    let token = app.login("boss", PASSWORD).await;

    assert!(!token.is_empty());
}
