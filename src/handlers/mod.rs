pub mod health;
pub mod receipts;
pub mod users;

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::errors::AppError;

/// Header carrying the id of the calling user.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// The user a request acts on behalf of, taken from [`USER_ID_HEADER`].
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user_id = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok());
        ready(user_id.map(CurrentUser).ok_or(AppError::Unauthorized))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        users::register,
        users::login,
        receipts::create_receipt,
        receipts::list_receipts,
        receipts::get_receipt,
        receipts::get_receipt_text,
        receipts::get_receipt_text_url,
        health::health,
    ),
    tags(
        (name = "users", description = "Registration and login"),
        (name = "receipts", description = "Receipts and their text rendering"),
        (name = "health", description = "Liveness of the service and its database"),
    )
)]
pub struct ApiDoc;

/// Register every route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .route("/login", web::post().to(users::login))
        .route("/users", web::post().to(users::register))
        .service(
            web::scope("/receipts")
                .route("", web::post().to(receipts::create_receipt))
                .route("", web::get().to(receipts::list_receipts))
                .route("/{id}", web::get().to(receipts::get_receipt))
                .route("/{id}/text", web::get().to(receipts::get_receipt_text))
                .route("/{id}/text-url", web::get().to(receipts::get_receipt_text_url)),
        );
}
