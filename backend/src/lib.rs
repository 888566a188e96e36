//! Nimble inventory backend
//!
//! Products, reference data, purchase and sales orders for a small business.
//! Purchase deliveries and sales move stock and record price history through
//! an injected [`store::EntityStore`], so the same services run against
//! PostgreSQL in production and an in-memory store in tests.

use std::{sync::Arc, time::Duration};

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};

use config::StoreBackend;
use store::{EntityStore, MemoryStore, PgStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub config: Arc<Config>,
}

/// Open the configured entity store.
///
/// For PostgreSQL this connects the pool and, in development, applies the
/// bundled migrations.
pub async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn EntityStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            if config.database.url.trim().is_empty() {
                return Err(AppError::Configuration("database.url is empty".to_string()).into());
            }

            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&config.database.url)
                .await?;

            tracing::info!("Database connection established");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            Ok(Arc::new(PgStore::new(db_pool)))
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Nimble Inventory API v1"
}
