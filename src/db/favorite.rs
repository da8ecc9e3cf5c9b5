use futures::TryStreamExt;
use sqlx::PgPool;

use crate::{error::Error, model::Book};

use super::error::{DatabaseError, is_unique_violation};

#[derive(Debug, PartialEq, Eq)]
pub enum FavoriteToggle {
    Added,
    Removed,
}

/// Idempotent favorite toggle. An active row is deactivated in place; a
/// re-like inserts a fresh row so the unlike history survives. The partial
/// unique index on active rows turns a lost insert race into a second
/// deactivation, so two concurrent toggles still net out to one add and one
/// remove.
#[tracing::instrument(name = "toggle favorite", skip_all, fields(user_id, book_id))]
pub async fn toggle_favorite(
    pool: &PgPool,
    user_id: i64,
    book_id: i64,
) -> Result<FavoriteToggle, Error> {
    let deactivated = deactivate_favorite(pool, user_id, book_id).await?;
    if deactivated {
        return Ok(FavoriteToggle::Removed);
    }

    match sqlx::query("INSERT INTO favorites (user_id, book_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(book_id)
        .execute(pool)
        .await
    {
        Ok(_) => Ok(FavoriteToggle::Added),
        Err(e) if is_unique_violation(&e) => {
            deactivate_favorite(pool, user_id, book_id).await?;
            Ok(FavoriteToggle::Removed)
        }
        Err(e) => Err(Error::Database(DatabaseError::Database(e))),
    }
}

async fn deactivate_favorite(pool: &PgPool, user_id: i64, book_id: i64) -> Result<bool, Error> {
    let result = sqlx::query(
        "UPDATE favorites
         SET unliked_at = NOW()
         WHERE user_id = $1 AND book_id = $2 AND unliked_at IS NULL",
    )
    .bind(user_id)
    .bind(book_id)
    .execute(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::Database(e)))?;

    Ok(result.rows_affected() > 0)
}

#[tracing::instrument(name = "get user favorites", skip_all, fields(user_id))]
pub async fn get_user_favorites(pool: &PgPool, user_id: i64) -> Result<Vec<Book>, Error> {
    let mut stream = sqlx::query_as::<_, Book>(
        "SELECT
            books.id, books.external_id, books.title, books.author,
            books.description, books.published_date, books.cover_url,
            books.created_at
         FROM
            favorites
         INNER JOIN
            books ON favorites.book_id = books.id
         WHERE
            favorites.user_id = $1 AND favorites.unliked_at IS NULL
         ORDER BY favorites.liked_at DESC",
    )
    .bind(user_id)
    .fetch(pool);

    let mut books = Vec::new();
    while let Some(book) = stream
        .try_next()
        .await
        .map_err(|e| Error::Database(DatabaseError::Database(e)))?
    {
        books.push(book);
    }

    Ok(books)
}
