// TestDependencies - in-memory implementations for testing
//
// Provides a store and a places lookup that can be injected into ServerDeps
// so the domain and the HTTP layer run without Postgres or the network.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{BasePlaceStore, BasePlacesLookup, PlaceDetails, ServerDeps, StoreError};
use crate::domains::places::models::{Place, PlaceFilter, StatusFilter};

// =============================================================================
// In-memory Place Store
// =============================================================================

/// Store backed by a vector kept in insertion order.
///
/// Applies the same version check as the Postgres store.
#[derive(Default)]
pub struct InMemoryPlaceStore {
    places: Mutex<Vec<Place>>,
    /// Saves still to be rejected as if another writer got there first
    forced_conflicts: AtomicUsize,
    save_attempts: AtomicUsize,
}

impl InMemoryPlaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a place directly, bypassing the version check
    pub fn with_place(self, place: Place) -> Self {
        let version = place.version().max(1);
        self.places
            .lock()
            .unwrap()
            .push(place.with_version(version));
        self
    }

    /// Reject the next `count` saves with a version conflict
    pub fn with_conflicting_saves(self, count: usize) -> Self {
        self.forced_conflicts.store(count, Ordering::SeqCst);
        self
    }

    /// Number of `save` calls so far, rejected ones included
    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored place, deleted ones included
    pub fn all(&self) -> Vec<Place> {
        self.places.lock().unwrap().clone()
    }

    fn matching(&self, filter: &PlaceFilter) -> Vec<Place> {
        self.places
            .lock()
            .unwrap()
            .iter()
            .filter(|place| filter.matches(place))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BasePlaceStore for InMemoryPlaceStore {
    async fn find_by_id(
        &self,
        id: &str,
        status: StatusFilter,
    ) -> Result<Option<Place>, StoreError> {
        Ok(self
            .places
            .lock()
            .unwrap()
            .iter()
            .find(|place| place.id() == id && status.matches(place.status()))
            .cloned())
    }

    async fn find_by_alias(
        &self,
        alias: &str,
        status: StatusFilter,
    ) -> Result<Option<Place>, StoreError> {
        Ok(self
            .places
            .lock()
            .unwrap()
            .iter()
            .find(|place| {
                place.aliases().iter().any(|a| a == alias) && status.matches(place.status())
            })
            .cloned())
    }

    async fn find(&self, filter: &PlaceFilter) -> Result<Vec<Place>, StoreError> {
        Ok(self.matching(filter))
    }

    fn stream(&self, filter: PlaceFilter) -> BoxStream<'_, Result<Place, StoreError>> {
        stream::iter(self.matching(&filter).into_iter().map(Ok)).boxed()
    }

    async fn save(&self, place: &Place) -> Result<Place, StoreError> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        let forced = self
            .forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
        if forced.is_ok() {
            return Err(StoreError::VersionConflict {
                id: place.id().to_string(),
            });
        }

        let mut places = self.places.lock().unwrap();
        let existing = places.iter().position(|p| p.id() == place.id());

        let saved = match (existing, place.version()) {
            (None, 0) => {
                let saved = place.clone().with_version(1);
                places.push(saved.clone());
                saved
            }
            (Some(index), version) if places[index].version() == version && version > 0 => {
                let saved = place.clone().with_version(version + 1);
                places[index] = saved.clone();
                saved
            }
            _ => {
                return Err(StoreError::VersionConflict {
                    id: place.id().to_string(),
                })
            }
        };

        Ok(saved)
    }
}

// =============================================================================
// Mock Places Lookup
// =============================================================================

pub struct MockPlacesLookup {
    places: Mutex<HashMap<String, PlaceDetails>>,
    failing: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockPlacesLookup {
    pub fn new() -> Self {
        Self {
            places: Mutex::new(HashMap::new()),
            failing: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a directory entry under `place_id`
    pub fn with_place(self, place_id: &str, details: PlaceDetails) -> Self {
        self.places
            .lock()
            .unwrap()
            .insert(place_id.to_string(), details);
        self
    }

    /// A lookup whose every call fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// Ids requested so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockPlacesLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BasePlacesLookup for MockPlacesLookup {
    async fn find_by_id(&self, place_id: &str) -> Result<Option<PlaceDetails>> {
        self.calls.lock().unwrap().push(place_id.to_string());

        if self.failing {
            return Err(anyhow!("places lookup is down"));
        }

        Ok(self.places.lock().unwrap().get(place_id).cloned())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Test wiring: in-memory store plus mock lookup, both reachable for
/// assertions after the code under test ran.
pub struct TestDependencies {
    pub store: Arc<InMemoryPlaceStore>,
    pub lookup: Arc<MockPlacesLookup>,
    pub api_host: String,
}

impl TestDependencies {
    pub const API_HOST: &'static str = "https://api.test";

    pub fn new() -> Self {
        Self::with(InMemoryPlaceStore::new(), MockPlacesLookup::new())
    }

    pub fn with(store: InMemoryPlaceStore, lookup: MockPlacesLookup) -> Self {
        Self {
            store: Arc::new(store),
            lookup: Arc::new(lookup),
            api_host: Self::API_HOST.to_string(),
        }
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.store.clone(),
            self.lookup.clone(),
            self.api_host.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
