//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use crate::api::handlers::{health, user_login, user_register, AuthResponse};

#[derive(OpenApi)]
#[openapi(
    paths(health::health, user_register::register, user_login::login),
    components(schemas(
        user_register::UserRegister,
        user_login::UserLogin,
        AuthResponse
    )),
    tags(
        (name = "register", description = "User registration"),
        (name = "login", description = "Credential verification"),
        (name = "health", description = "Service metadata")
    )
)]
pub struct ApiDoc;
