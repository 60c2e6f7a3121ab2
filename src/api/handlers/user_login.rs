use crate::{
    api::{
        handlers::{error_response, valid_password, valid_username, AuthResponse},
        Auth,
    },
    auth::LoginRequest,
};
use axum::{extract::Extension, http::StatusCode, Json};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserLogin {
    username: String,
    #[serde(skip_serializing)]
    password: String,
}

type LoginResponse = Result<(StatusCode, Json<AuthResponse>), (StatusCode, String)>;

#[utoipa::path(
    post,
    path= "/user/login",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login successful", body = AuthResponse, content_type = "application/json"),
        (status = 400, description = "Missing or malformed payload", body = String),
        (status = 401, description = "Unauthorized", body = String),
        (status = 500, description = "Login could not be completed", body = String),
    ),
    tag= "login"
)]
// axum handler for login
#[instrument(skip(auth, payload))]
pub async fn login(auth: Extension<Arc<Auth>>, payload: Option<Json<UserLogin>>) -> LoginResponse {
    let user: UserLogin = match payload {
        Some(Json(payload)) => payload,
        None => return Err((StatusCode::BAD_REQUEST, "Missing payload".to_string())),
    };

    debug!(username = %user.username, "login attempt");

    // Structurally impossible credentials are rejected before touching the
    // store; this leaks nothing a 401 would not.
    if !valid_username(&user.username) {
        return Err((StatusCode::BAD_REQUEST, "Invalid payload".to_string()));
    }

    if !valid_password(&user.password) {
        return Err((StatusCode::BAD_REQUEST, "Invalid payload".to_string()));
    }

    let request = LoginRequest {
        username: user.username,
        password: SecretString::from(user.password),
    };

    match auth.login(request).await {
        Ok(result) => Ok((StatusCode::OK, Json(AuthResponse::from(result)))),
        Err(err) => Err(error_response(&err)),
    }
}
