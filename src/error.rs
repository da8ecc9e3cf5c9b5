use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::ValidationErrors;

use crate::{auth::error::AuthError, catalog::CatalogError, db::error::DatabaseError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database error")]
    Database(DatabaseError),

    #[error("Auth error")]
    Auth(AuthError),

    #[error("Catalog error")]
    Catalog(CatalogError),

    #[error("Validation error")]
    Validation(ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(&'static str),

    #[error("Other error: {0}")]
    Other(anyhow::Error),
}

impl From<DatabaseError> for Error {
    fn from(value: DatabaseError) -> Self {
        Self::Database(value)
    }
}

impl From<CatalogError> for Error {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

fn respond(status: StatusCode, code: &str) -> axum::response::Response {
    (status, Json(json!({ "error": code }))).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::Database(database_error) => match database_error {
                DatabaseError::Database(error) => {
                    tracing::error!(err.msg = %error, err.details = ?error, "Database Error");

                    respond(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
                DatabaseError::NotFound => respond(StatusCode::NOT_FOUND, "not_found"),
            },
            Error::Auth(auth_error) => match auth_error {
                AuthError::TokenMissing => respond(StatusCode::UNAUTHORIZED, "login_required"),
                AuthError::TokenExpired => respond(StatusCode::UNAUTHORIZED, "session_expired"),
                AuthError::TokenInvalid => respond(StatusCode::UNAUTHORIZED, "invalid_token"),
                AuthError::IncorrectCredential => {
                    respond(StatusCode::UNAUTHORIZED, "invalid_credentials")
                }
                AuthError::DuplicateEmail => respond(StatusCode::CONFLICT, "email_taken"),
                AuthError::RegistrationDisabled => {
                    respond(StatusCode::FORBIDDEN, "registration_disabled")
                }
                AuthError::JwtError(error) => {
                    tracing::error!(err.msg = %error, err.details = ?error, "JWT Error");

                    respond(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
                AuthError::PasswordError(error) => {
                    tracing::error!(err.msg = %error, err.details = ?error, "Password Hash Error");

                    respond(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
            Error::Catalog(catalog_error) => match catalog_error {
                CatalogError::NotFound => respond(StatusCode::NOT_FOUND, "not_found"),
                error => {
                    tracing::error!(err.msg = %error, err.details = ?error, "Catalog Error");

                    respond(StatusCode::BAD_GATEWAY, "catalog_unavailable")
                }
            },
            Error::Validation(validation_error) => {
                tracing::debug!(err.msg = %validation_error, "Validation Error");

                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": validation_error.to_string() })),
                )
                    .into_response()
            }
            Error::Conflict(code) => respond(StatusCode::CONFLICT, code),
            Error::Other(error) => {
                tracing::error!(err.msg = %error, err.details = ?error, "Other Error");

                respond(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}
