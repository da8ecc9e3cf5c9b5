use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use bookly::auth::{encode_jwt, jwt::encode_jwt_with_lifetime};
use chrono::Duration;
use http_body_util::BodyExt;

use crate::AppStateTest;

async fn error_code(response: axum::response::Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

    value["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn should_throw_error_when_request_does_not_contain_token() {
    let test_state = AppStateTest::new(false).await;

    let request = Request::builder().uri("/me").body(Body::empty()).unwrap();

    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "login_required");
}

#[tokio::test]
async fn should_throw_error_when_auth_header_does_not_contain_bearer() {
    let test_state = AppStateTest::new(false).await;

    let request = Request::builder()
        .uri("/me")
        .header(
            axum::http::header::AUTHORIZATION,
            "not-bearer random-string",
        )
        .body(Body::empty())
        .unwrap();

    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "login_required");
}

#[tokio::test]
async fn should_throw_error_when_jwt_token_is_invalid() {
    let test_state = AppStateTest::new(false).await;

    let request = Request::builder()
        .uri("/me")
        .header(axum::http::header::AUTHORIZATION, "bearer random-string")
        .body(Body::empty())
        .unwrap();

    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "invalid_token");
}

#[tokio::test]
async fn should_throw_error_when_jwt_token_is_expired() {
    let test_state = AppStateTest::new(false).await;

    let token =
        encode_jwt_with_lifetime(1000, &test_state.app_state.config.jwt, Duration::hours(-1))
            .unwrap();

    let request = Request::builder()
        .uri("/me")
        .header(
            axum::http::header::AUTHORIZATION,
            format!("bearer {}", token),
        )
        .body(Body::empty())
        .unwrap();

    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "session_expired");
}

#[tokio::test]
async fn should_throw_error_when_user_is_missing() {
    let mut test_state = AppStateTest::new(true).await;

    let token = encode_jwt(1000, &test_state.app_state.config.jwt).unwrap();

    let request = Request::builder()
        .uri("/me")
        .header(
            axum::http::header::AUTHORIZATION,
            format!("bearer {}", token),
        )
        .body(Body::empty())
        .unwrap();

    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "invalid_token");

    test_state.cleanup().await;
}

#[tokio::test]
async fn should_be_ok_with_bearer_header() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;

    let request = Request::builder()
        .uri("/me")
        .header(
            axum::http::header::AUTHORIZATION,
            format!("bearer {}", token),
        )
        .body(Body::empty())
        .unwrap();

    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::OK);

    test_state.cleanup().await;
}

#[tokio::test]
async fn should_be_ok_with_session_cookie() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;

    let request = Request::builder()
        .uri("/me")
        .header(
            axum::http::header::COOKIE,
            format!("bookly_session={}", token),
        )
        .body(Body::empty())
        .unwrap();

    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::OK);

    test_state.cleanup().await;
}
