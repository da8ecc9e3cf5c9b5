pub mod jwt_auth;

pub use jwt_auth::{SESSION_COOKIE, jwt_auth_middleware, optional_jwt_auth_middleware};
