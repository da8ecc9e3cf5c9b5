use anyhow::Context;
use secrecy::SecretString;
use sqlx::PgPool;

use crate::{
    auth::{compute_password_hash, error::AuthError},
    error::Error,
    model::User,
    telemetry::spawn_blocking_with_tracing,
};

use super::error::{DatabaseError, is_unique_violation};

const USER_COLUMNS: &str = "id, email, display_name";

#[derive(sqlx::FromRow)]
struct UserCredentialRow {
    id: i64,
    email: String,
    display_name: Option<String>,
    password: String,
}

#[tracing::instrument(name = "create user", skip_all, fields(email))]
pub async fn create_user(
    pool: &PgPool,
    email: String,
    password: SecretString,
    display_name: Option<String>,
) -> Result<User, Error> {
    let password_hashed = spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .context("compute password hash")
        .map_err(Error::Other)??;

    let query = format!(
        "INSERT INTO users
            (email, password, display_name)
         VALUES
            ($1, $2, $3)
         RETURNING {USER_COLUMNS}"
    );

    match sqlx::query_as::<_, User>(&query)
        .bind(&email)
        .bind(&password_hashed)
        .bind(&display_name)
        .fetch_one(pool)
        .await
    {
        Ok(user) => Ok(user),
        Err(e) if is_unique_violation(&e) => Err(Error::Auth(AuthError::DuplicateEmail)),
        Err(e) => Err(Error::Database(DatabaseError::Database(e))),
    }
}

/// Identity plus stored hash, for credential verification only.
#[tracing::instrument(name = "get user by email", skip_all, fields(email))]
pub async fn get_user_with_password_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<(User, String)>, Error> {
    let row = sqlx::query_as::<_, UserCredentialRow>(
        "SELECT
            id, email, display_name, password
         FROM
            users
         WHERE
            email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::Database(e)))?;

    Ok(row.map(|row| {
        (
            User {
                id: row.id,
                email: row.email,
                display_name: row.display_name,
            },
            row.password,
        )
    }))
}

#[tracing::instrument(name = "get user by id", skip_all, fields(user_id))]
pub async fn get_user_by_id_optional(pool: &PgPool, user_id: i64) -> Result<Option<User>, Error> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

    sqlx::query_as::<_, User>(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::Database(DatabaseError::Database(e)))
}
