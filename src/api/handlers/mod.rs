pub mod health;
pub use self::health::health;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

// common types and helpers for the handlers
use crate::auth::{AuthError, AuthResult};
use axum::http::StatusCode;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Body returned by both register and login on success.
#[derive(ToSchema, Serialize, Debug)]
pub struct AuthResponse {
    pub username: String,
    pub display_name: String,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl From<AuthResult> for AuthResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            username: result.username,
            display_name: result.display_name,
            token: result.token,
            photo_url: result.photo_url,
        }
    }
}

pub fn valid_username(username: &str) -> bool {
    // 3 to 32 characters, starting alphanumeric
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{2,31}$")
        .map_or(false, |re| re.is_match(username))
}

pub fn valid_password(password: &str) -> bool {
    (8..=512).contains(&password.len())
}

/// Map an auth failure to the caller-visible status.
///
/// Username and password rejections collapse into one 401 message so a
/// caller cannot probe which usernames exist; the distinct kind is logged.
pub(crate) fn error_response(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::DuplicateUsername => {
            (StatusCode::CONFLICT, "User already exists".to_string())
        }
        AuthError::InvalidUsername | AuthError::InvalidPassword => {
            debug!("credentials rejected: {err}");
            (
                StatusCode::UNAUTHORIZED,
                "Invalid credentials".to_string(),
            )
        }
        AuthError::Persistence(source) => {
            error!("user store failure: {source:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
        }
        AuthError::TokenIssuance(source) => {
            error!("token issuance failure: {source:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
        }
        AuthError::EntropySource(source) => {
            error!("entropy source failure: {source:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
        }
    }
}
