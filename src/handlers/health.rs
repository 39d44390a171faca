use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::db::{self, DbPool};

/// GET /health
///
/// Reports whether the database answers a trivial query.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are up"),
        (status = 503, description = "Database unreachable"),
    ),
    tag = "health"
)]
pub async fn health(pool: web::Data<DbPool>) -> HttpResponse {
    let pool = pool.into_inner();
    match web::block(move || db::ping(&pool)).await {
        Ok(Ok(())) => HttpResponse::Ok().json(json!({ "status": "ok" })),
        Ok(Err(e)) => {
            log::warn!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
        Err(e) => {
            log::warn!("Health check could not run: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
    }
}
