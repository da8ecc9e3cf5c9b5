use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    controllers::books::reconcile,
    db::book::{get_aggregate, get_book_by_external_id},
    db::error::DatabaseError,
    db::rating::{create_rating, get_book_ratings, remove_rating, update_rating},
    error::Error,
    model::{Aggregate, RatingEntry, User},
    state::SharedAppState,
};

#[derive(Deserialize, Validate)]
pub struct RateRequest {
    #[validate(range(min = 1, max = 5))]
    pub score: i16,
}

#[tracing::instrument(name = "[POST] rating", skip_all, fields(external_id))]
pub async fn store(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(external_id): Path<String>,
    Json(request): Json<RateRequest>,
) -> Result<Json<Aggregate>, Error> {
    request.validate().map_err(Error::Validation)?;

    let (book, _) = reconcile(&app_state, &external_id).await?;

    create_rating(&app_state.pool, user.id, book.id, request.score).await?;

    let aggregate = get_aggregate(&app_state.pool, book.id).await?;
    Ok(Json(aggregate))
}

#[tracing::instrument(name = "[PUT] rating", skip_all, fields(external_id))]
pub async fn update(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(external_id): Path<String>,
    Json(request): Json<RateRequest>,
) -> Result<Json<Aggregate>, Error> {
    request.validate().map_err(Error::Validation)?;

    let book = get_book_by_external_id(&app_state.pool, &external_id)
        .await?
        .ok_or(Error::Database(DatabaseError::NotFound))?;

    update_rating(&app_state.pool, user.id, book.id, request.score).await?;

    let aggregate = get_aggregate(&app_state.pool, book.id).await?;
    Ok(Json(aggregate))
}

#[tracing::instrument(name = "[DELETE] rating", skip_all, fields(external_id))]
pub async fn destroy(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(external_id): Path<String>,
) -> Result<Json<Aggregate>, Error> {
    let book = get_book_by_external_id(&app_state.pool, &external_id)
        .await?
        .ok_or(Error::Database(DatabaseError::NotFound))?;

    remove_rating(&app_state.pool, user.id, book.id).await?;

    let aggregate = get_aggregate(&app_state.pool, book.id).await?;
    Ok(Json(aggregate))
}

/// Public list of active ratings. A book nobody has seen locally simply has
/// no ratings yet.
#[tracing::instrument(name = "[GET] ratings", skip_all, fields(external_id))]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Path(external_id): Path<String>,
) -> Result<Json<Vec<RatingEntry>>, Error> {
    let entries = match get_book_by_external_id(&app_state.pool, &external_id).await? {
        Some(book) => get_book_ratings(&app_state.pool, book.id).await?,
        None => Vec::new(),
    };

    Ok(Json(entries))
}
