use axum::http::{HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use uuid::Uuid;

use otpgate_auth::domain::types::{OtpSettings, TokenSettings};
use otpgate_auth::infra::sms::{TwilioOptions, TwilioSmsDispatcher};
use otpgate_auth::router::build_router;
use otpgate_auth::state::AppState;
use otpgate_testing::auth::MockAuth;

use crate::helpers::TEST_JWT_SECRET;

/// Router over a disconnected database and an unreachable SMS endpoint.
/// Only requests rejected before any store call can succeed here.
fn server() -> TestServer {
    let sms = TwilioSmsDispatcher::new(TwilioOptions {
        base_url: "http://127.0.0.1:9".into(),
        account_sid: "AC123".into(),
        auth_token: "token".into(),
        from: "+15005550006".into(),
        timeout: std::time::Duration::from_secs(1),
    })
    .unwrap();
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        sms,
        otp: OtpSettings::default(),
        tokens: TokenSettings::new(TEST_JWT_SECRET),
    };
    TestServer::new(build_router(state)).unwrap()
}

fn assert_validation(body: &Value) {
    assert_eq!(body["kind"], "VALIDATION");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

// ── health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_health_checks_with_request_id() {
    let server = server();

    let resp = server.get("/healthz").await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let resp = server.get("/readyz").await;
    assert_eq!(resp.status_code(), StatusCode::OK);
}

// ── validation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_invalid_phone_on_send() {
    let resp = server()
        .post("/auth/send-mobile-otp")
        .json(&json!({ "phone": "1234567890" }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    assert_validation(&resp.json::<Value>());
}

#[tokio::test]
async fn should_reject_missing_phone_on_login() {
    let resp = server().post("/auth/phone-login").json(&json!({})).await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    assert_validation(&resp.json::<Value>());
}

#[tokio::test]
async fn should_reject_non_json_body() {
    let resp = server()
        .post("/auth/send-mobile-otp")
        .text("phone=9876543210")
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    assert_validation(&resp.json::<Value>());
}

#[tokio::test]
async fn should_reject_wrong_length_otp() {
    let resp = server()
        .post("/auth/verify-mobile-otp")
        .json(&json!({ "phone": "+919876543210", "otp": "123456" }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    let body = resp.json::<Value>();
    assert_validation(&body);
    assert_eq!(body["message"], "otp must be a 4-digit number");
}

#[tokio::test]
async fn should_reject_unknown_purpose() {
    let resp = server()
        .post("/auth/verify-mobile-otp")
        .json(&json!({ "phone": "9876543210", "otp": "1234", "purpose": "signup" }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    assert_validation(&resp.json::<Value>());
}

#[tokio::test]
async fn should_reject_missing_refresh_token() {
    let server = server();
    for path in ["/auth/logout", "/auth/refresh-tokens"] {
        let resp = server.post(path).json(&json!({})).await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST, "{path}");
        assert_validation(&resp.json::<Value>());
    }
}

// ── authentication ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_bearer_token_for_profile() {
    let server = server();

    let resp = server.get("/users/me").await;
    assert_eq!(resp.status_code(), StatusCode::UNAUTHORIZED);
    let body = resp.json::<Value>();
    assert_eq!(body["kind"], "UNAUTHENTICATED");
    assert_eq!(body["message"], "Please authenticate");

    let resp = server
        .patch("/users/welcome-status")
        .json(&json!({ "isWelcomeDone": true }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_token_signed_with_other_secret() {
    let auth = MockAuth::new(Uuid::now_v7(), 0);
    let resp = server()
        .get("/users/me")
        .add_header(AUTHORIZATION, auth.bearer("another-secret"))
        .await;
    assert_eq!(resp.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_require_boolean_welcome_status() {
    let auth = MockAuth::new(Uuid::now_v7(), 0);
    let server = server();

    for body in [json!({ "isWelcomeDone": "yes" }), json!({})] {
        let resp = server
            .patch("/users/welcome-status")
            .add_header(AUTHORIZATION, auth.bearer(TEST_JWT_SECRET))
            .json(&body)
            .await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
        assert_validation(&resp.json::<Value>());
    }
}

#[tokio::test]
async fn should_reject_malformed_authorization_header() {
    let resp = server()
        .get("/users/me")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"))
        .await;
    assert_eq!(resp.status_code(), StatusCode::UNAUTHORIZED);
}
