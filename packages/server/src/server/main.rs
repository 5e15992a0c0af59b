// Main entry point for API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use places_core::kernel::{
    BasePlacesLookup, DisabledPlacesLookup, GooglePlacesClient, PostgresPlaceStore, ServerDeps,
};
use places_core::{server::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use tokio::signal::ctrl_c;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,places_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Place Answers API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded");

    // Connect to database
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected");

    let store = PostgresPlaceStore::new(pool);

    // Run migrations
    info!("Running database migrations...");
    store.migrate().await.context("Failed to run migrations")?;
    info!("Migrations complete");

    let places_lookup: Arc<dyn BasePlacesLookup> = match config.google_maps_api_key {
        Some(api_key) => Arc::new(GooglePlacesClient::new(api_key)?),
        None => {
            warn!("GOOGLE_MAPS_API_KEY not set, places lookup disabled");
            Arc::new(DisabledPlacesLookup)
        }
    };

    // Build application
    let deps = ServerDeps::new(Arc::new(store), places_lookup, config.api_host.clone());
    let app = build_app(deps, Duration::from_secs(config.stats_cache_ttl_secs));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    info!("Starting server on {}", addr);
    info!("Public API host: {}", config.api_host);
    info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
