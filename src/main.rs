use std::io;
use std::sync::Arc;

use actix_web::web;
use dotenvy::dotenv;
use receipt_service::application::receipt_service::ReceiptService;
use receipt_service::application::user_service::UserService;
use receipt_service::config::AppConfig;
use receipt_service::domain::render::ReceiptTemplate;
use receipt_service::infrastructure::receipt_repo::DieselReceiptRepository;
use receipt_service::infrastructure::user_repo::DieselUserRepository;
use receipt_service::{build_server, build_storage, connect_with_retry, run_migrations};

fn startup_error(e: impl std::fmt::Display) -> io::Error {
    log::error!("Startup failed: {}", e);
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(startup_error)?;

    let pool = connect_with_retry(
        &config.database_url,
        config.db_max_connections,
        &config.db_retry,
    )
    .map_err(startup_error)?;
    run_migrations(&pool).map_err(startup_error)?;

    let template = match &config.merchant_name {
        Some(name) => ReceiptTemplate::default().with_merchant_name(name.clone()),
        None => ReceiptTemplate::default(),
    };
    let receipts = web::Data::new(ReceiptService::new(
        Arc::new(DieselReceiptRepository::new(pool.clone())),
        build_storage(&config.storage),
        template,
        config.receipt_line_width,
    ));
    let users = web::Data::new(UserService::new(Arc::new(DieselUserRepository::new(
        pool.clone(),
    ))));

    log::info!(
        "Starting server at http://{}:{}",
        config.host,
        config.port
    );

    build_server(pool, receipts, users, &config.host, config.port)?.await
}
