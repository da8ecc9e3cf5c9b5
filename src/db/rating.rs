use sqlx::PgPool;

use crate::{
    error::Error,
    model::{RatedBook, RatingEntry},
};

use super::error::{DatabaseError, is_unique_violation};

/// Create-only: a second active rating for the same (user, book) pair is a
/// conflict, surfaced by the partial unique index rather than a pre-read.
#[tracing::instrument(name = "create rating", skip_all, fields(user_id, book_id, score))]
pub async fn create_rating(
    pool: &PgPool,
    user_id: i64,
    book_id: i64,
    score: i16,
) -> Result<(), Error> {
    match sqlx::query("INSERT INTO ratings (user_id, book_id, score) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(book_id)
        .bind(score)
        .execute(pool)
        .await
    {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(Error::Conflict("rating_exists")),
        Err(e) => Err(Error::Database(DatabaseError::Database(e))),
    }
}

#[tracing::instrument(name = "update rating", skip_all, fields(user_id, book_id, score))]
pub async fn update_rating(
    pool: &PgPool,
    user_id: i64,
    book_id: i64,
    score: i16,
) -> Result<(), Error> {
    let result = sqlx::query(
        "UPDATE ratings
         SET score = $3, updated_at = NOW()
         WHERE user_id = $1 AND book_id = $2 AND unrated_at IS NULL",
    )
    .bind(user_id)
    .bind(book_id)
    .bind(score)
    .execute(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::Database(e)))?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}

#[tracing::instrument(name = "remove rating", skip_all, fields(user_id, book_id))]
pub async fn remove_rating(pool: &PgPool, user_id: i64, book_id: i64) -> Result<(), Error> {
    let result = sqlx::query(
        "UPDATE ratings
         SET unrated_at = NOW()
         WHERE user_id = $1 AND book_id = $2 AND unrated_at IS NULL",
    )
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

#[tracing::instrument(name = "get book ratings", skip_all, fields(book_id))]
pub async fn get_book_ratings(pool: &PgPool, book_id: i64) -> Result<Vec<RatingEntry>, Error> {
    sqlx::query_as::<_, RatingEntry>(
        "SELECT
            ratings.id, ratings.score, ratings.created_at,
            users.display_name AS rater
         FROM
            ratings
         INNER JOIN
            users ON ratings.user_id = users.id
         WHERE
            ratings.book_id = $1 AND ratings.unrated_at IS NULL
         ORDER BY ratings.created_at DESC",
    )
    .bind(book_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::Database(e)))
}

#[tracing::instrument(name = "get user ratings", skip_all, fields(user_id))]
pub async fn get_user_ratings(pool: &PgPool, user_id: i64) -> Result<Vec<RatedBook>, Error> {
    sqlx::query_as::<_, RatedBook>(
        "SELECT
            books.id, books.external_id, books.title, books.author,
            books.description, books.published_date, books.cover_url,
            books.created_at,
            ratings.score, ratings.updated_at AS rated_at
         FROM
            ratings
         INNER JOIN
            books ON ratings.book_id = books.id
         WHERE
            ratings.user_id = $1 AND ratings.unrated_at IS NULL
         ORDER BY ratings.updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::Database(e)))
}
