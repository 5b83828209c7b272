//! One-time password flow over HTTP.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use chrono::TimeDelta;
use serde_json::json;

use shoptrail_integration_tests::TestApp;

#[tokio::test]
async fn test_verify_succeeds_exactly_once() {
    let app = TestApp::new();
    let body = json!({"email": "a@b.c", "otp": "482913"});

    let response = app.post("/send-otp", &body).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "OTP stored");

    let response = app.post("/verify-otp", &body).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "OTP verified");

    let response = app.post("/verify-otp", &body).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.text(), "Invalid OTP");
}

#[tokio::test]
async fn test_numeric_codes_match_their_text_form() {
    let app = TestApp::new();

    let response = app
        .post("/send-otp", &json!({"email": "a@b.c", "otp": 123456}))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .post("/verify-otp", &json!({"email": "a@b.c", "otp": 123456}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "OTP verified");

    app.post("/send-otp", &json!({"email": "a@b.c", "otp": "654321"}))
        .await;
    let response = app
        .post("/verify-otp", &json!({"email": "a@b.c", "otp": 654321}))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .post("/verify-otp", &json!({"email": "a@b.c", "otp": 654321}))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_code_is_gone() {
    let app = TestApp::new();
    let body = json!({"email": "a@b.c", "otp": "482913"});

    app.post("/send-otp", &body).await;
    app.clock.advance(TimeDelta::minutes(5) + TimeDelta::seconds(1));

    let response = app.post("/verify-otp", &body).await;
    assert_eq!(response.status, StatusCode::GONE);
    assert_eq!(response.text(), "OTP expired");

    let response = app.post("/verify-otp", &body).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_resend_replaces_code() {
    let app = TestApp::new();

    app.post("/send-otp", &json!({"email": "a@b.c", "otp": "111111"}))
        .await;
    app.post("/send-otp", &json!({"email": "a@b.c", "otp": "222222"}))
        .await;

    let stale = app
        .post("/verify-otp", &json!({"email": "a@b.c", "otp": "111111"}))
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let fresh = app
        .post("/verify-otp", &json!({"email": "a@b.c", "otp": "222222"}))
        .await;
    assert_eq!(fresh.status, StatusCode::OK);
}

#[tokio::test]
async fn test_send_requires_fields() {
    let app = TestApp::new();

    let response = app.post("/send-otp", &json!({"email": "a@b.c"})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Email and OTP required");
}

#[tokio::test]
async fn test_verify_with_missing_fields_is_unauthorized() {
    let app = TestApp::new();

    let response = app.post("/verify-otp", &json!({})).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
