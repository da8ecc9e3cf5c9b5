use std::sync::Arc;

use axum::{Extension, Json, extract::State};

use crate::{
    db::{favorite::get_user_favorites, rating::get_user_ratings, review::get_user_reviews},
    error::Error,
    model::{Book, RatedBook, ReviewedBook, User},
    state::SharedAppState,
};

#[tracing::instrument(name = "[GET] library favorites", skip_all)]
pub async fn favorites(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
) -> Result<Json<Vec<Book>>, Error> {
    let books = get_user_favorites(&app_state.pool, user.id).await?;

    Ok(Json(books))
}

#[tracing::instrument(name = "[GET] library reviews", skip_all)]
pub async fn reviews(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
) -> Result<Json<Vec<ReviewedBook>>, Error> {
    let reviews = get_user_reviews(&app_state.pool, user.id).await?;

    Ok(Json(reviews))
}

#[tracing::instrument(name = "[GET] library ratings", skip_all)]
pub async fn ratings(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
) -> Result<Json<Vec<RatedBook>>, Error> {
    let ratings = get_user_ratings(&app_state.pool, user.id).await?;

    Ok(Json(ratings))
}
