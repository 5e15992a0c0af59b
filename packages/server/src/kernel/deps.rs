//! Server dependencies for place actions (using traits for testability)
//!
//! This module provides the central dependency container used by the places
//! domain. The store and the external lookup are trait objects so tests can
//! swap in the in-memory doubles from `test_dependencies`.

use std::sync::Arc;

use crate::common::EnvelopeBuilder;
use crate::kernel::{BasePlaceStore, BasePlacesLookup};

/// Server dependencies accessible to actions
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BasePlaceStore>,
    pub places_lookup: Arc<dyn BasePlacesLookup>,
    /// Public URL prefix for hypermedia links (e.g. `https://api.example.org`)
    pub api_host: String,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BasePlaceStore>,
        places_lookup: Arc<dyn BasePlacesLookup>,
        api_host: impl Into<String>,
    ) -> Self {
        Self {
            store,
            places_lookup,
            api_host: api_host.into(),
        }
    }

    /// Fresh response builder bound to the configured API host
    pub fn envelope(&self) -> EnvelopeBuilder {
        EnvelopeBuilder::new(self.api_host.as_str())
    }
}
