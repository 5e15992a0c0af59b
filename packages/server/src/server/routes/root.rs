use axum::{extract::Extension, Json};

use crate::common::Envelope;
use crate::domains::places::root_links;
use crate::server::app::AppState;
use crate::server::ApiError;

/// API entry point: advertises the available operations
pub async fn root_handler(Extension(state): Extension<AppState>) -> Json<Envelope> {
    Json(state.deps.envelope().links(root_links()).build())
}

/// Fallback for unknown routes
pub async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}
