#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Auth token is missing")]
    TokenMissing,
    #[error("Auth token is expired")]
    TokenExpired,
    #[error("Auth token is invalid")]
    TokenInvalid,
    #[error("Jwt error")]
    JwtError(jsonwebtoken::errors::Error),
    #[error("Password error")]
    PasswordError(argon2::password_hash::Error),
    #[error("Incorrect credential")]
    IncorrectCredential,
    #[error("Email is already registered")]
    DuplicateEmail,
    #[error("Registration is disabled")]
    RegistrationDisabled,
}
