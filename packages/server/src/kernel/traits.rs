// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Query composition and resolve rules live in the places repository.
//
// Naming convention: Base* for trait names (e.g., BasePlaceStore)

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::common::Position;
use crate::domains::places::models::{Place, PlaceFilter, StatusFilter};

// =============================================================================
// Place Store Trait (Infrastructure - persistence)
// =============================================================================

/// Persistence failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The stored version moved since the place was read.
    #[error("Place {id} was modified concurrently")]
    VersionConflict { id: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be turned back into a valid place.
    #[error("Invalid stored place: {0}")]
    InvalidData(String),
}

#[async_trait]
pub trait BasePlaceStore: Send + Sync {
    /// Find a place by its primary id
    async fn find_by_id(&self, id: &str, status: StatusFilter)
        -> Result<Option<Place>, StoreError>;

    /// Find the place that lists `alias` among its aliases
    async fn find_by_alias(
        &self,
        alias: &str,
        status: StatusFilter,
    ) -> Result<Option<Place>, StoreError>;

    /// All matching places, in creation order
    async fn find(&self, filter: &PlaceFilter) -> Result<Vec<Place>, StoreError>;

    /// Same as [`BasePlaceStore::find`] without buffering the result set
    fn stream(&self, filter: PlaceFilter) -> BoxStream<'_, Result<Place, StoreError>>;

    /// Create or update a place.
    ///
    /// Version 0 inserts; any other version updates only if the stored version
    /// is unchanged. Returns the place carrying its new version.
    async fn save(&self, place: &Place) -> Result<Place, StoreError>;

    /// Connectivity check used by the health endpoint
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// =============================================================================
// Places Lookup Trait (Infrastructure - external place directory)
// =============================================================================

/// Place record from the external directory
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetails {
    /// Identifier the directory considers authoritative; may differ from the
    /// id that was asked for
    pub canonical_id: String,
    pub position: Position,
    pub formatted_address: Option<String>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub rating: Option<f64>,
    /// Link to open the place in the directory's own UI
    pub url: Option<String>,
}

#[async_trait]
pub trait BasePlacesLookup: Send + Sync {
    /// Look up a place. `Ok(None)` means the directory does not know the id.
    async fn find_by_id(&self, place_id: &str) -> Result<Option<PlaceDetails>>;
}
