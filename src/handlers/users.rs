use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::user_service::UserService;
use crate::domain::user::User;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPublic {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        UserPublic {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /users
///
/// Registers a new user. The password is stored as an argon2 hash.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserPublic),
        (status = 400, description = "Invalid username, email or password"),
        (status = 409, description = "Username or email already registered"),
    ),
    tag = "users"
)]
pub async fn register(
    service: web::Data<UserService>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let user = web::block(move || service.register(&body.username, &body.email, &body.password))
        .await??;

    Ok(HttpResponse::Created().json(UserPublic::from(user)))
}

/// POST /login
///
/// Checks the credentials and returns the user. Its `id` identifies the
/// caller on receipt endpoints through the `X-User-Id` header.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = UserPublic),
        (status = 401, description = "Incorrect email or password"),
    ),
    tag = "users"
)]
pub async fn login(
    service: web::Data<UserService>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let user = web::block(move || service.authenticate(&body.email, &body.password)).await??;

    Ok(HttpResponse::Ok().json(UserPublic::from(user)))
}
