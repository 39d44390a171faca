pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::receipt_service::ReceiptService;
use crate::application::user_service::UserService;
use crate::config::StorageConfig;
use crate::handlers::ApiDoc;
use crate::infrastructure::storage::{HttpObjectStorage, LocalDirStorage, Storage};

pub use db::{connect_with_retry, DbError, DbPool, RetryPolicy};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// The receipt service as wired into the HTTP layer.
pub type AppReceiptService = ReceiptService<Storage>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::Migration(e.to_string()))?;
    Ok(())
}

/// Instantiate the storage backend selected in configuration.
pub fn build_storage(config: &StorageConfig) -> Storage {
    match config {
        StorageConfig::Local {
            dir,
            public_base_url,
        } => Storage::Local(LocalDirStorage::new(dir.clone(), public_base_url.clone())),
        StorageConfig::Http {
            endpoint,
            bucket,
            public_base_url,
            api_token,
        } => Storage::Http(HttpObjectStorage::new(
            reqwest::Client::new(),
            endpoint.clone(),
            bucket.clone(),
            public_base_url.clone(),
            api_token.clone(),
        )),
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    receipts: web::Data<AppReceiptService>,
    users: web::Data<UserService>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(receipts.clone())
            .app_data(users.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
            .service(
                SwaggerUi::new("/swagger/docs/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
