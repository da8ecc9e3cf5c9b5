use axum::{
    body::Body,
    http::{self, Request, StatusCode},
};
use bookly::controllers::favorites::ToggleResponse;
use http_body_util::BodyExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use crate::{AppStateTest, insert_fake_book, volume_json};

fn toggle_request(external_id: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/books/{}/favorite", external_id))
        .header(
            http::header::AUTHORIZATION,
            format!("bearer {}", token),
        )
        .body(Body::empty())
        .unwrap()
}

async fn toggle_result(test_state: &AppStateTest, external_id: &str, token: &str) -> bool {
    let response = test_state
        .generate_response(toggle_request(external_id, token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let toggle: ToggleResponse = serde_json::from_slice(&body).unwrap();

    toggle.favorited
}

#[tokio::test]
async fn toggle_should_require_auth() {
    let test_state = AppStateTest::new(false).await;

    let request = Request::builder()
        .method("POST")
        .uri("/books/XYZ/favorite")
        .body(Body::empty())
        .unwrap();

    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn toggle_twice_returns_to_original_state() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;
    let book = insert_fake_book(&test_state.app_state.pool).await;

    assert!(toggle_result(&test_state, &book.external_id, &token).await);

    let active: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM favorites WHERE user_id = $1 AND unliked_at IS NULL",
    )
    .bind(user.id)
    .fetch_one(&test_state.app_state.pool)
    .await
    .unwrap();
    assert_eq!(active, 1);

    assert!(!toggle_result(&test_state, &book.external_id, &token).await);

    let active: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM favorites WHERE user_id = $1 AND unliked_at IS NULL",
    )
    .bind(user.id)
    .fetch_one(&test_state.app_state.pool)
    .await
    .unwrap();
    assert_eq!(active, 0);

    // The unliked row stays behind as history.
    let total: i64 = sqlx::query_scalar("SELECT count(*) FROM favorites WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&test_state.app_state.pool)
        .await
        .unwrap();
    assert_eq!(total, 1);

    test_state.cleanup().await;
}

#[tokio::test]
async fn relike_keeps_single_active_row() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;
    let book = insert_fake_book(&test_state.app_state.pool).await;

    assert!(toggle_result(&test_state, &book.external_id, &token).await);
    assert!(!toggle_result(&test_state, &book.external_id, &token).await);
    assert!(toggle_result(&test_state, &book.external_id, &token).await);

    let active: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM favorites WHERE user_id = $1 AND unliked_at IS NULL",
    )
    .bind(user.id)
    .fetch_one(&test_state.app_state.pool)
    .await
    .unwrap();
    assert_eq!(active, 1);

    let total: i64 = sqlx::query_scalar("SELECT count(*) FROM favorites WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&test_state.app_state.pool)
        .await
        .unwrap();
    assert_eq!(total, 2);

    test_state.cleanup().await;
}

#[tokio::test]
async fn toggle_should_create_book_stub_on_first_sight() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes/fresh-book"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(volume_json("fresh-book", "Ubik")),
        )
        .mount(&mock_server)
        .await;

    let mut test_state = AppStateTest::new_with_catalog(&mock_server.uri()).await;

    let (_, token) = test_state.generate_jwt_with_user().await;

    assert!(toggle_result(&test_state, "fresh-book", &token).await);

    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM books WHERE external_id = $1")
        .bind("fresh-book")
        .fetch_one(&test_state.app_state.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    test_state.cleanup().await;
}

#[tokio::test]
async fn toggle_should_be_error_when_catalog_is_down_and_book_is_unknown() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(toggle_request("never-seen", &token))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    test_state.cleanup().await;
}
