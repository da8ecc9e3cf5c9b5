use sqlx::PgPool;

use crate::{
    error::Error,
    model::{Aggregate, Book, BookMetadata, ViewerState},
};

use super::error::DatabaseError;

const BOOK_COLUMNS: &str =
    "id, external_id, title, author, description, published_date, cover_url, created_at";

#[tracing::instrument(name = "get book by external id", skip_all, fields(external_id))]
pub async fn get_book_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<Book>, Error> {
    let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE external_id = $1");

    sqlx::query_as::<_, Book>(&query)
        .bind(external_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::Database(DatabaseError::Database(e)))
}

/// Insert a cache row seeded from catalog metadata, or return the existing
/// one. Two concurrent first-sight requests both land here; the unique index
/// on `external_id` lets exactly one insert win and the loser re-reads.
#[tracing::instrument(name = "find or create book", skip_all, fields(external_id = %metadata.external_id))]
pub async fn find_or_create_book(pool: &PgPool, metadata: &BookMetadata) -> Result<Book, Error> {
    let query = format!(
        "INSERT INTO books
            (external_id, title, author, description, published_date, cover_url)
         VALUES
            ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (external_id) DO NOTHING
         RETURNING {BOOK_COLUMNS}"
    );

    let inserted = sqlx::query_as::<_, Book>(&query)
        .bind(&metadata.external_id)
        .bind(&metadata.title)
        .bind(&metadata.author)
        .bind(&metadata.description)
        .bind(&metadata.published_date)
        .bind(&metadata.cover_url)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::Database(DatabaseError::Database(e)))?;

    match inserted {
        Some(book) => Ok(book),
        None => get_book_by_external_id(pool, &metadata.external_id)
            .await?
            .ok_or(Error::Database(DatabaseError::NotFound)),
    }
}

/// Derived statistics over *active* interaction rows. The mean of zero
/// ratings is 0 by construction.
#[tracing::instrument(name = "get book aggregate", skip_all, fields(book_id))]
pub async fn get_aggregate(pool: &PgPool, book_id: i64) -> Result<Aggregate, Error> {
    sqlx::query_as::<_, Aggregate>(
        "SELECT
            COALESCE(
                (SELECT AVG(score) FROM ratings
                 WHERE book_id = $1 AND unrated_at IS NULL),
                0
            )::DOUBLE PRECISION AS average_rating,
            (SELECT COUNT(*) FROM favorites
             WHERE book_id = $1 AND unliked_at IS NULL) AS favorite_count,
            (SELECT COUNT(*) FROM reviews
             WHERE book_id = $1) AS review_count",
    )
    .bind(book_id)
    .fetch_one(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::Database(e)))
}

#[tracing::instrument(name = "get viewer state", skip_all, fields(book_id, user_id))]
pub async fn get_viewer_state(
    pool: &PgPool,
    book_id: i64,
    user_id: i64,
) -> Result<ViewerState, Error> {
    sqlx::query_as::<_, ViewerState>(
        "SELECT
            (SELECT score FROM ratings
             WHERE book_id = $1 AND user_id = $2 AND unrated_at IS NULL) AS rating,
            EXISTS(
                SELECT 1 FROM favorites
                WHERE book_id = $1 AND user_id = $2 AND unliked_at IS NULL
            ) AS is_favorite",
    )
    .bind(book_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::Database(e)))
}
