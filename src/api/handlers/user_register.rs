use crate::{
    api::{
        handlers::{error_response, valid_password, valid_username, AuthResponse},
        Auth,
    },
    auth::RegisterRequest,
};
use axum::{extract::Extension, http::StatusCode, Json};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserRegister {
    username: String,
    #[serde(skip_serializing)]
    password: String,
    display_name: String,
}

type RegisterResponse = Result<(StatusCode, Json<AuthResponse>), (StatusCode, String)>;

#[utoipa::path(
    post,
    path= "/user/register",
    request_body = UserRegister,
    responses (
        (status = 201, description = "Registration successful", body = AuthResponse, content_type = "application/json"),
        (status = 400, description = "Missing or malformed payload", body = String),
        (status = 409, description = "User with the specified username already exists", body = String),
        (status = 500, description = "Registration could not be completed", body = String),
    ),
    tag= "register"
)]
// axum handler for register
#[instrument(skip(auth, payload))]
pub async fn register(
    auth: Extension<Arc<Auth>>,
    payload: Option<Json<UserRegister>>,
) -> RegisterResponse {
    let user: UserRegister = match payload {
        Some(Json(payload)) => payload,
        None => return Err((StatusCode::BAD_REQUEST, "Missing payload".to_string())),
    };

    debug!(username = %user.username, "register attempt");

    // if not valid username or password return 400
    if !valid_username(&user.username) {
        return Err((StatusCode::BAD_REQUEST, "Invalid username".to_string()));
    }

    if !valid_password(&user.password) {
        return Err((StatusCode::BAD_REQUEST, "Invalid password".to_string()));
    }

    let request = RegisterRequest {
        username: user.username,
        password: SecretString::from(user.password),
        display_name: user.display_name,
    };

    match auth.register(request).await {
        Ok(result) => Ok((StatusCode::CREATED, Json(AuthResponse::from(result)))),
        Err(err) => Err(error_response(&err)),
    }
}
