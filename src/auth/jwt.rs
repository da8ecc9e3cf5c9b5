use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use secrecy::ExposeSecret;

use crate::{config::Jwt, error::Error};

use super::error::AuthError;

/// Session tokens are valid for 24 hours.
const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(serde::Deserialize, serde::Serialize)]
pub struct Claim {
    pub user_id: i64,
    aud: String,
    iss: String,
    exp: usize,
    iat: usize,
}

pub fn encode_jwt(user_id: i64, jwt: &Jwt) -> Result<String, Error> {
    encode_jwt_with_lifetime(user_id, jwt, Duration::hours(TOKEN_LIFETIME_HOURS))
}

pub fn encode_jwt_with_lifetime(
    user_id: i64,
    jwt: &Jwt,
    lifetime: Duration,
) -> Result<String, Error> {
    let now = Utc::now();
    let exp: usize = (now + lifetime).timestamp() as usize;
    let iat = now.timestamp() as usize;

    let claim = Claim {
        user_id,
        aud: jwt.aud.expose_secret().to_string(),
        iss: jwt.iss.expose_secret().to_string(),
        iat,
        exp,
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(jwt.secret.expose_secret().as_bytes()),
    )
    .map_err(|e| Error::Auth(AuthError::JwtError(e)))
}

/// Decode and validate a session token. Expired tokens map to
/// [`AuthError::TokenExpired`] so clients can prompt a re-login instead of
/// treating the session as never having existed.
pub fn decode_jwt(jwt_token: &str, jwt: &Jwt) -> Result<TokenData<Claim>, Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[jwt.iss.expose_secret()]);
    validation.set_audience(&[jwt.aud.expose_secret()]);

    decode::<Claim>(
        jwt_token,
        &DecodingKey::from_secret(jwt.secret.expose_secret().as_ref()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::Auth(AuthError::TokenExpired),
        _ => Error::Auth(AuthError::TokenInvalid),
    })
}
