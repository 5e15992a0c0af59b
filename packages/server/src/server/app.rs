//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    add_answer_handler, get_place_handler, health_handler, list_places_handler,
    not_found_handler, root_handler, stats_handler, StatsCache,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub stats_cache: Arc<StatsCache>,
}

impl AppState {
    pub fn new(deps: ServerDeps, stats_ttl: Duration) -> Self {
        Self {
            deps: Arc::new(deps),
            stats_cache: Arc::new(StatsCache::new(stats_ttl)),
        }
    }
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, stats_ttl: Duration) -> Router {
    let app_state = AppState::new(deps, stats_ttl);

    // CORS configuration - the API is public and read-mostly
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/", get(root_handler))
        .route("/places", get(list_places_handler))
        .route("/places/:place_id", get(get_place_handler))
        .route("/places/:place_id/answers", post(add_answer_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
