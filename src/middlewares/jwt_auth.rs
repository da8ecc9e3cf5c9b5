use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    auth::{decode_jwt, error::AuthError},
    db::user::get_user_by_id_optional,
    error::Error,
    state::SharedAppState,
};

/// HTTP-only cookie carrying the session token.
pub const SESSION_COOKIE: &str = "bookly_session";

/// The session cookie is the primary transport; an `Authorization: bearer`
/// header is accepted for non-browser clients.
fn extract_token(req: &Request) -> Option<String> {
    let jar = CookieJar::from_headers(req.headers());
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let mut header = auth_header.split_whitespace();
    let (bearer, token) = (header.next()?, header.next()?);
    if bearer.to_lowercase() != *"bearer" {
        return None;
    }

    Some(token.to_string())
}

#[tracing::instrument(name = "[MIDDLEWARE] jwt auth", skip_all)]
pub async fn jwt_auth_middleware(
    State(app_state): State<SharedAppState>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    let token = match extract_token(&req) {
        Some(token) => token,
        None => {
            return Err(Error::Auth(AuthError::TokenMissing));
        }
    };

    let token_data = decode_jwt(&token, &app_state.config.jwt)?;

    let user_optional = get_user_by_id_optional(&app_state.pool, token_data.claims.user_id).await?;
    let user = match user_optional {
        Some(user) => Arc::new(user),
        None => {
            return Err(Error::Auth(AuthError::TokenInvalid));
        }
    };

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Like [`jwt_auth_middleware`] but for public routes that personalize when a
/// session happens to be present. A missing or bad token falls through to the
/// anonymous view instead of a 401.
#[tracing::instrument(name = "[MIDDLEWARE] optional jwt auth", skip_all)]
pub async fn optional_jwt_auth_middleware(
    State(app_state): State<SharedAppState>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    if let Some(token) = extract_token(&req) {
        if let Ok(token_data) = decode_jwt(&token, &app_state.config.jwt) {
            let user_optional =
                get_user_by_id_optional(&app_state.pool, token_data.claims.user_id).await?;
            if let Some(user) = user_optional {
                req.extensions_mut().insert(Arc::new(user));
            }
        }
    }

    Ok(next.run(req).await)
}
