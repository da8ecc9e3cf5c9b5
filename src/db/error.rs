#[derive(thiserror::Error, Debug)]
pub enum DatabaseError {
    #[error("Database error")]
    Database(sqlx::Error),
    #[error("Record not found")]
    NotFound,
}

/// Postgres signals a violated unique (or partial unique) index with
/// SQLSTATE 23505. Find-or-create and toggle flows treat it as "a concurrent
/// request won the race", not as a failure.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.code().as_deref() == Some("23505"),
        _ => false,
    }
}
