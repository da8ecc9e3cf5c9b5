use std::borrow::Cow;

use anyhow::Context;
use axum::{Json, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::{Validate, ValidateEmail, ValidateLength, ValidationError, ValidationErrors};

use crate::{
    auth::{encode_jwt, error::AuthError, verify_password_hash},
    db::user::{create_user, get_user_with_password_by_email},
    error::Error,
    middlewares::SESSION_COOKIE,
    model::User,
    state::SharedAppState,
    telemetry::spawn_blocking_with_tracing,
};

/// A valid Argon2id PHC string verified against when the email is unknown,
/// so login takes one hash verification regardless of account existence.
const FALLBACK_PASSWORD_HASH: &str = "$argon2id$v=19$m=15000,t=2,p=1$\
gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

fn validate_credentials(email: &str, password: &SecretString) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if !email.validate_email() {
        errors.add(
            "email",
            ValidationError::new("email_email").with_message(Cow::from("Incorrect email format")),
        );
    }
    if !email.validate_length(Some(1), Some(100), None) {
        errors.add(
            "email",
            ValidationError::new("email_length")
                .with_message(Cow::from("Email length must be between 1 and 100")),
        );
    }

    let password = password.expose_secret();
    if !password.validate_length(Some(6), Some(64), None) {
        errors.add(
            "password",
            ValidationError::new("password_length")
                .with_message(Cow::from("Password length must be between 6 and 64")),
        );
    }

    errors
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: SecretString,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = validate_credentials(&self.email, &self.password);

        if let Some(display_name) = &self.display_name
            && !display_name.validate_length(Some(1), Some(100), None)
        {
            errors.add(
                "displayName",
                ValidationError::new("display_name_length")
                    .with_message(Cow::from("Display name length must be between 1 and 100")),
            );
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let errors = validate_credentials(&self.email, &self.password);

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

#[tracing::instrument(name = "[POST] auth register", skip_all)]
pub async fn register(
    State(app_state): State<SharedAppState>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), Error> {
    request.validate().map_err(Error::Validation)?;

    if !app_state.config.application.allow_registration {
        return Err(Error::Auth(AuthError::RegistrationDisabled));
    }

    let email = request.email.trim().to_lowercase();
    let user = create_user(
        &app_state.pool,
        email,
        request.password,
        request.display_name,
    )
    .await?;

    let user_id = user.id;
    let token = spawn_blocking_with_tracing(move || encode_jwt(user_id, &app_state.config.jwt))
        .await
        .context("encode jwt")
        .map_err(Error::Other)??;

    let jar = jar.add(session_cookie(token.clone()));

    Ok((jar, Json(AuthResponse { token, user })))
}

#[tracing::instrument(name = "[POST] auth login", skip_all)]
pub async fn login(
    State(app_state): State<SharedAppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), Error> {
    request.validate().map_err(Error::Validation)?;

    let email = request.email.trim().to_lowercase();
    let record = get_user_with_password_by_email(&app_state.pool, &email).await?;

    let (user, expected_hash) = match record {
        Some((user, hash)) => (Some(user), hash),
        None => (None, FALLBACK_PASSWORD_HASH.to_string()),
    };

    spawn_blocking_with_tracing(move || verify_password_hash(expected_hash, request.password))
        .await
        .context("verify password hash")
        .map_err(Error::Other)?
        .map_err(|_| Error::Auth(AuthError::IncorrectCredential))?;

    let user = user.ok_or(Error::Auth(AuthError::IncorrectCredential))?;

    let user_id = user.id;
    let token = spawn_blocking_with_tracing(move || encode_jwt(user_id, &app_state.config.jwt))
        .await
        .context("encode jwt")
        .map_err(Error::Other)??;

    let jar = jar.add(session_cookie(token.clone()));

    Ok((jar, Json(AuthResponse { token, user })))
}

#[tracing::instrument(name = "[POST] auth logout", skip_all)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));

    (jar, Json(json!({ "message": "logged_out" })))
}
