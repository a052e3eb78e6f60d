//! Book catalog service entry point
//!
//! Loads the environment, connects MongoDB and Redis, registers every
//! singleton, ensures the indexes and starts the Actix server.

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::Governor;
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};

use catalog_service_backend::caching::redis::RedisClient;
use catalog_service_backend::config::{CorsConfig, Environment, IdentityConfig, RateLimitConfig, ServerConfig};
use catalog_service_backend::core::registry::ServiceLocator;
use catalog_service_backend::db::Database;
use catalog_service_backend::errors::AppError;
use catalog_service_backend::middlewares::rate_limit;
use catalog_service_backend::repositories::{
    books::BookRepository, collections::CollectionRepository, comments::CommentRepository,
    favorites::FavoriteRepository, users::UserRepository,
};
use catalog_service_backend::routes::{configure_all_routes, not_found};

#[actix_web::main]
async fn main() -> io::Result<()> {
    load_env_file();
    init_logging();

    info!("🚀 Starting book catalog service ({:?})", Environment::current());

    let (database, redis_client) = initialize_data_stores().await?;

    ServiceLocator::set(database);
    ServiceLocator::set(redis_client);

    ServiceLocator::initialize_all().await.map_err(|e| {
        error!("Service initialization failed: {}", e);
        io::Error::other(e.to_string())
    })?;

    ensure_indexes().await.map_err(|e| {
        error!("Index creation failed: {}", e);
        io::Error::other(e.to_string())
    })?;

    if IdentityConfig::project_id().is_none() {
        warn!("IDENTITY_PROJECT_ID is not set; every authenticated request will be rejected");
    }

    info!("✅ All services initialized");

    start_http_server().await
}

async fn start_http_server() -> io::Result<()> {
    let bind_address = ServerConfig::bind_address();

    let rate_limit_config = RateLimitConfig::from_env();
    let governor_conf = rate_limit::governor_config(&rate_limit_config)
        .map_err(|e| io::Error::other(e.to_string()))?;

    info!(
        "🛡️ Rate limit: {} requests per {}s per client",
        rate_limit_config.max_requests, rate_limit_config.window_seconds
    );
    info!("🌐 Listening on http://{}", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);

    let allowed_origins = CorsConfig::allowed_origins();

    HttpServer::new(move || {
        App::new()
            .wrap(Governor::new(&governor_conf))
            .wrap(configure_cors(&allowed_origins))
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_all_routes)
            .default_service(web::route().to(not_found))
    })
    .bind(&bind_address)?
    .workers(ServerConfig::workers())
    .run()
    .await
}

/// Loads `.env.prod`, `.env.dev` or `.env` depending on `PROFILE`.
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod loaded"),
            Err(e) => error!("Failed to load .env.prod: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev loaded"),
            Err(e) => error!("Failed to load .env.dev: {}", e),
        },
        _ => {
            dotenv().ok();
            info!("Default .env loaded");
        }
    }
}

/// `RUST_LOG` overrides the default `info,actix_web=debug` filter.
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
}

async fn initialize_data_stores() -> io::Result<(Arc<Database>, Arc<RedisClient>)> {
    info!("📡 Connecting to data stores...");

    let database = Database::new().await.map_err(|e| {
        error!("MongoDB connection failed: {}", e);
        io::Error::other(e.to_string())
    })?;

    let redis_client = RedisClient::new().await.map_err(|e| {
        error!("Redis connection failed: {}", e);
        io::Error::other(e.to_string())
    })?;

    Ok((Arc::new(database), Arc::new(redis_client)))
}

async fn ensure_indexes() -> Result<(), AppError> {
    BookRepository::instance().create_indexes().await?;
    UserRepository::instance().create_indexes().await?;
    FavoriteRepository::instance().create_indexes().await?;
    CollectionRepository::instance().create_indexes().await?;
    CommentRepository::instance().create_indexes().await?;

    info!("📇 MongoDB indexes ensured");
    Ok(())
}

fn configure_cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(3600)
}
