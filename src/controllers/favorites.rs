use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    controllers::books::reconcile,
    db::favorite::{FavoriteToggle, toggle_favorite},
    error::Error,
    model::User,
    state::SharedAppState,
};

#[derive(Serialize, Deserialize)]
pub struct ToggleResponse {
    pub favorited: bool,
}

#[tracing::instrument(name = "[POST] favorite toggle", skip_all, fields(external_id))]
pub async fn toggle(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(external_id): Path<String>,
) -> Result<Json<ToggleResponse>, Error> {
    let (book, _) = reconcile(&app_state, &external_id).await?;

    let result = toggle_favorite(&app_state.pool, user.id, book.id).await?;

    Ok(Json(ToggleResponse {
        favorited: result == FavoriteToggle::Added,
    }))
}
