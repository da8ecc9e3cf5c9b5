use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::{ValidationError, ValidationErrors};

use crate::{
    controllers::books::reconcile,
    db::book::{get_aggregate, get_book_by_external_id},
    db::error::DatabaseError,
    db::review::{delete_review, get_book_reviews, update_review, upsert_review},
    error::Error,
    model::{Aggregate, Review, ReviewEntry, User},
    sanitize::clean_review,
    state::SharedAppState,
};

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub body: String,
}

impl ReviewRequest {
    /// Sanitized body, or a validation error when nothing survives cleaning
    /// (empty, whitespace, or markup-only input).
    fn cleaned_body(&self) -> Result<String, Error> {
        clean_review(&self.body).ok_or_else(|| {
            let mut errors = ValidationErrors::new();
            errors.add(
                "body",
                ValidationError::new("body_empty")
                    .with_message(Cow::from("Review body must not be empty")),
            );

            Error::Validation(errors)
        })
    }
}

/// POST upserts: a second review from the same user overwrites the first.
#[tracing::instrument(name = "[POST] review", skip_all, fields(external_id))]
pub async fn store(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(external_id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<Review>, Error> {
    let body = request.cleaned_body()?;

    let (book, _) = reconcile(&app_state, &external_id).await?;

    let review = upsert_review(&app_state.pool, user.id, book.id, &body).await?;

    Ok(Json(review))
}

/// PUT requires a pre-existing review.
#[tracing::instrument(name = "[PUT] review", skip_all, fields(external_id))]
pub async fn update(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(external_id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<Review>, Error> {
    let body = request.cleaned_body()?;

    let book = get_book_by_external_id(&app_state.pool, &external_id)
        .await?
        .ok_or(Error::Database(DatabaseError::NotFound))?;

    let review = update_review(&app_state.pool, user.id, book.id, &body).await?;

    Ok(Json(review))
}

#[tracing::instrument(name = "[DELETE] review", skip_all, fields(external_id))]
pub async fn destroy(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(external_id): Path<String>,
) -> Result<Json<Aggregate>, Error> {
    let book = get_book_by_external_id(&app_state.pool, &external_id)
        .await?
        .ok_or(Error::Database(DatabaseError::NotFound))?;

    delete_review(&app_state.pool, user.id, book.id).await?;

    let aggregate = get_aggregate(&app_state.pool, book.id).await?;
    Ok(Json(aggregate))
}

#[tracing::instrument(name = "[GET] reviews", skip_all, fields(external_id))]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Path(external_id): Path<String>,
) -> Result<Json<Vec<ReviewEntry>>, Error> {
    let entries = match get_book_by_external_id(&app_state.pool, &external_id).await? {
        Some(book) => get_book_reviews(&app_state.pool, book.id).await?,
        None => Vec::new(),
    };

    Ok(Json(entries))
}
