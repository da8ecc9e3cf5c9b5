use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    catalog::CatalogError,
    db::book::{find_or_create_book, get_aggregate, get_book_by_external_id, get_viewer_state},
    db::error::DatabaseError,
    error::Error,
    model::{Book, BookDetail, BookMetadata, User},
    state::{AppState, SharedAppState},
};

/// Reconciliation core: pair the local cache row with live catalog metadata,
/// creating the row on first sight.
///
/// Failure policy when the catalog is unreachable or no longer has the entry:
/// a local row downgrades the response to a cache-only view; no local row
/// means there is nothing to serve, so the catalog failure (or a 404 for an
/// id the catalog never knew) surfaces to the client.
pub(crate) async fn reconcile(
    app_state: &AppState,
    external_id: &str,
) -> Result<(Book, Option<BookMetadata>), Error> {
    let local = get_book_by_external_id(&app_state.pool, external_id).await?;

    match app_state.catalog.fetch_by_id(external_id).await {
        Ok(volume) => {
            let metadata = BookMetadata::from_volume(volume);
            let book = match local {
                Some(book) => book,
                None => find_or_create_book(&app_state.pool, &metadata).await?,
            };

            Ok((book, Some(metadata)))
        }
        Err(CatalogError::NotFound) => match local {
            Some(book) => {
                tracing::warn!(external_id, "catalog dropped entry, serving cached record");

                Ok((book, None))
            }
            None => Err(Error::Database(DatabaseError::NotFound)),
        },
        Err(catalog_error) => match local {
            Some(book) => {
                tracing::warn!(
                    external_id,
                    err.msg = %catalog_error,
                    "catalog unavailable, serving cached record"
                );

                Ok((book, None))
            }
            None => Err(Error::Catalog(catalog_error)),
        },
    }
}

#[tracing::instrument(name = "[GET] books search", skip_all, fields(query))]
pub async fn search(
    State(app_state): State<SharedAppState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<BookMetadata>>, Error> {
    let volumes = app_state.catalog.search(&query).await?;

    let results = volumes.into_iter().map(BookMetadata::from_volume).collect();

    Ok(Json(results))
}

#[tracing::instrument(name = "[GET] books show", skip_all, fields(external_id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    user: Option<Extension<Arc<User>>>,
    Path(external_id): Path<String>,
) -> Result<Json<BookDetail>, Error> {
    let (book, metadata) = reconcile(&app_state, &external_id).await?;

    let aggregate = get_aggregate(&app_state.pool, book.id).await?;

    let viewer = match user {
        Some(Extension(user)) => Some(get_viewer_state(&app_state.pool, book.id, user.id).await?),
        None => None,
    };

    Ok(Json(BookDetail {
        metadata,
        book,
        aggregate,
        viewer,
    }))
}
