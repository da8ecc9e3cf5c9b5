use sqlx::PgPool;

use crate::{
    error::Error,
    model::{Review, ReviewEntry, ReviewedBook},
};

use super::error::DatabaseError;

const REVIEW_COLUMNS: &str = "id, user_id, book_id, body, created_at, updated_at";

/// One review per (user, book): insert, or overwrite the caller's existing
/// review in place.
#[tracing::instrument(name = "upsert review", skip_all, fields(user_id, book_id))]
pub async fn upsert_review(
    pool: &PgPool,
    user_id: i64,
    book_id: i64,
    body: &str,
) -> Result<Review, Error> {
    let query = format!(
        "INSERT INTO reviews
            (user_id, book_id, body)
         VALUES
            ($1, $2, $3)
         ON CONFLICT (user_id, book_id)
         DO UPDATE SET
            body = EXCLUDED.body,
            updated_at = NOW()
         RETURNING {REVIEW_COLUMNS}"
    );

    sqlx::query_as::<_, Review>(&query)
        .bind(user_id)
        .bind(book_id)
        .bind(body)
        .fetch_one(pool)
        .await
        .map_err(|e| Error::Database(DatabaseError::Database(e)))
}

#[tracing::instrument(name = "update review", skip_all, fields(user_id, book_id))]
pub async fn update_review(
    pool: &PgPool,
    user_id: i64,
    book_id: i64,
    body: &str,
) -> Result<Review, Error> {
    let query = format!(
        "UPDATE reviews
         SET body = $3, updated_at = NOW()
         WHERE user_id = $1 AND book_id = $2
         RETURNING {REVIEW_COLUMNS}"
    );

    sqlx::query_as::<_, Review>(&query)
        .bind(user_id)
        .bind(book_id)
        .bind(body)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::Database(DatabaseError::Database(e)))?
        .ok_or(Error::Database(DatabaseError::NotFound))
}

#[tracing::instrument(name = "delete review", skip_all, fields(user_id, book_id))]
pub async fn delete_review(pool: &PgPool, user_id: i64, book_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM reviews WHERE user_id = $1 AND book_id = $2")
        .bind(user_id)
        .bind(book_id)
        .execute(pool)
        .await
        .map_err(|e| Error::Database(DatabaseError::Database(e)))?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}

#[tracing::instrument(name = "get book reviews", skip_all, fields(book_id))]
pub async fn get_book_reviews(pool: &PgPool, book_id: i64) -> Result<Vec<ReviewEntry>, Error> {
    sqlx::query_as::<_, ReviewEntry>(
        "SELECT
            reviews.id, reviews.body, reviews.created_at, reviews.updated_at,
            users.display_name AS author
         FROM
            reviews
         INNER JOIN
            users ON reviews.user_id = users.id
         WHERE
            reviews.book_id = $1
         ORDER BY reviews.created_at DESC",
    )
    .bind(book_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::Database(e)))
}

#[tracing::instrument(name = "get user reviews", skip_all, fields(user_id))]
pub async fn get_user_reviews(pool: &PgPool, user_id: i64) -> Result<Vec<ReviewedBook>, Error> {
    sqlx::query_as::<_, ReviewedBook>(
        "SELECT
            books.id, books.external_id, books.title, books.author,
            books.description, books.published_date, books.cover_url,
            books.created_at,
            reviews.body, reviews.updated_at AS reviewed_at
         FROM
            reviews
         INNER JOIN
            books ON reviews.book_id = books.id
         WHERE
            reviews.user_id = $1
         ORDER BY reviews.updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::Database(e)))
}
