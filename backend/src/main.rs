//! Nimble inventory backend server

use std::{net::SocketAddr, sync::Arc};

use nimble_inventory_backend::{connect_store, create_app, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "nimble_server=debug,nimble_inventory_backend=debug,tower_http=debug,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Nimble inventory server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Store backend: {:?}", config.store.backend);

    let store = connect_store(&config).await?;

    // Create application state
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = config.bind_address().parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
