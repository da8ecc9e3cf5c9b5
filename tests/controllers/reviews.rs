use axum::{
    body::Body,
    http::{self, Request, StatusCode},
};
use bookly::model::{Review, ReviewEntry};
use http_body_util::BodyExt;
use serde_json::json;

use crate::{AppStateTest, insert_fake_book};

fn review_request(method: &str, external_id: &str, token: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(format!("/books/{}/review", external_id))
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, format!("bearer {}", token))
        .body(Body::from(
            serde_json::to_vec(&json!({ "body": body })).unwrap(),
        ))
        .unwrap()
}

#[tokio::test]
async fn store_should_upsert_review_in_place() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;
    let book = insert_fake_book(&test_state.app_state.pool).await;

    let response = test_state
        .generate_response(review_request("POST", &book.external_id, &token, "First take"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_state
        .generate_response(review_request(
            "POST",
            &book.external_id,
            &token,
            "Second take",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let review: Review = serde_json::from_slice(&body).unwrap();
    assert_eq!(review.body, "Second take");
    assert_eq!(review.user_id, user.id);

    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM reviews WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&test_state.app_state.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    test_state.cleanup().await;
}

#[tokio::test]
async fn store_should_sanitize_markup() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let book = insert_fake_book(&test_state.app_state.pool).await;

    let response = test_state
        .generate_response(review_request(
            "POST",
            &book.external_id,
            &token,
            "Great<script>alert('x')</script> book",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let review: Review = serde_json::from_slice(&body).unwrap();
    assert!(!review.body.contains("script"));
    assert!(review.body.contains("Great"));

    // The stored row is clean too, not just the response.
    let stored: String = sqlx::query_scalar("SELECT body FROM reviews WHERE id = $1")
        .bind(review.id)
        .fetch_one(&test_state.app_state.pool)
        .await
        .unwrap();
    assert!(!stored.contains("script"));

    test_state.cleanup().await;
}

#[tokio::test]
async fn store_should_reject_empty_body() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let book = insert_fake_book(&test_state.app_state.pool).await;

    for body in ["", "   ", "<script>alert('x')</script>"] {
        let response = test_state
            .generate_response(review_request("POST", &book.external_id, &token, body))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    test_state.cleanup().await;
}

#[tokio::test]
async fn update_should_be_not_found_without_prior_review() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let book = insert_fake_book(&test_state.app_state.pool).await;

    let response = test_state
        .generate_response(review_request("PUT", &book.external_id, &token, "Take two"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_state.cleanup().await;
}

#[tokio::test]
async fn update_should_replace_body() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let book = insert_fake_book(&test_state.app_state.pool).await;

    let response = test_state
        .generate_response(review_request("POST", &book.external_id, &token, "First take"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_state
        .generate_response(review_request("PUT", &book.external_id, &token, "Final take"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let review: Review = serde_json::from_slice(&body).unwrap();
    assert_eq!(review.body, "Final take");

    test_state.cleanup().await;
}

#[tokio::test]
async fn destroy_should_be_not_found_without_prior_review() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let book = insert_fake_book(&test_state.app_state.pool).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/books/{}/review", book.external_id))
        .header(http::header::AUTHORIZATION, format!("bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_state.cleanup().await;
}

#[tokio::test]
async fn destroy_should_remove_review() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;
    let book = insert_fake_book(&test_state.app_state.pool).await;

    let response = test_state
        .generate_response(review_request("POST", &book.external_id, &token, "A take"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/books/{}/review", book.external_id))
        .header(http::header::AUTHORIZATION, format!("bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM reviews WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&test_state.app_state.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);

    test_state.cleanup().await;
}

#[tokio::test]
async fn index_should_list_reviews_publicly() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let book = insert_fake_book(&test_state.app_state.pool).await;

    let response = test_state
        .generate_response(review_request("POST", &book.external_id, &token, "Loved it"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri(format!("/books/{}/reviews", book.external_id))
        .body(Body::empty())
        .unwrap();
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let entries: Vec<ReviewEntry> = serde_json::from_slice(&body).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].body, "Loved it");
    assert!(entries[0].author.is_some());

    test_state.cleanup().await;
}
