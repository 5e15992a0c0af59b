//! Place repository - query composition over the store and the places lookup.
//!
//! The store and the lookup stay dumb; every rule about which source wins,
//! how aliases are recorded and how deleted places are hidden lives here.

use std::sync::Arc;

use futures::TryStreamExt;
use tracing::{debug, info, instrument, warn};

use crate::common::GeoBounds;
use crate::domains::places::data::PlaceStats;
use crate::domains::places::errors::PlaceError;
use crate::domains::places::models::{
    AnswerSummary, Place, PlaceFilter, PlaceStatus, StatusFilter,
};
use crate::kernel::{BasePlaceStore, BasePlacesLookup, PlaceDetails, ServerDeps};

/// Options for [`PlaceRepository::resolve`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Always consult the lookup for descriptive details
    pub expand: bool,
    pub status: StatusFilter,
}

/// A resolved place plus the lookup details, when they were fetched
#[derive(Debug, Clone)]
pub struct Resolved {
    pub place: Place,
    pub details: Option<PlaceDetails>,
}

/// List query accepted by [`PlaceRepository::list`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceQuery {
    pub bounds: Option<GeoBounds>,
    pub dominant: Option<bool>,
    pub status: Option<PlaceStatus>,
}

impl PlaceQuery {
    fn to_filter(&self) -> PlaceFilter {
        PlaceFilter {
            status: self.status.into(),
            within: self.bounds.map(|bounds| bounds.to_polygon()),
            dominant: self.dominant,
        }
    }
}

#[derive(Clone)]
pub struct PlaceRepository {
    store: Arc<dyn BasePlaceStore>,
    lookup: Arc<dyn BasePlacesLookup>,
}

impl PlaceRepository {
    pub fn new(deps: &ServerDeps) -> Self {
        Self {
            store: deps.store.clone(),
            lookup: deps.places_lookup.clone(),
        }
    }

    /// Find a place by id or alias, falling back to the external lookup.
    ///
    /// Returns `Ok(None)` when neither the store nor the lookup knows the id,
    /// and for deleted places unless `options.status` admits them.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        place_id: &str,
        options: ResolveOptions,
    ) -> Result<Option<Resolved>, PlaceError> {
        // Deleted records are read regardless of the filter so an id that
        // belongs to a deleted place never falls through to the lookup.
        let stored = self.find_stored(place_id).await?;

        if let Some(place) = &stored {
            if !options.status.matches(place.status()) {
                debug!(status = %place.status(), "Stored place hidden by status filter");
                return Ok(None);
            }
        }

        if stored.is_some() && !options.expand {
            return Ok(stored.map(|place| Resolved {
                place,
                details: None,
            }));
        }

        // A place found by alias is expanded under its stored id, which the
        // directory still knows after retiring the alias.
        let lookup_id = stored.as_ref().map_or(place_id, |place| place.id());
        let details = match self.lookup.find_by_id(lookup_id).await {
            Ok(details) => details,
            Err(err) if stored.is_some() => {
                warn!(error = %err, "Places lookup failed, serving stored place only");
                None
            }
            Err(err) => {
                warn!(error = %err, "Places lookup failed");
                return Err(PlaceError::LookupUnavailable(err));
            }
        };

        if let Some(place) = stored {
            return Ok(Some(Resolved { place, details }));
        }

        let Some(details) = details else {
            debug!("Place unknown to store and lookup");
            return Ok(None);
        };

        // The lookup may answer with a different, canonical id that is
        // already stored.
        if details.canonical_id != place_id {
            if let Some(place) = self.find_stored(&details.canonical_id).await? {
                if !options.status.matches(place.status()) {
                    return Ok(None);
                }
                info!(canonical_id = %details.canonical_id, "Resolved place through canonical id");
                return Ok(Some(Resolved {
                    place: with_alias(place, place_id),
                    details: Some(details),
                }));
            }
        }

        let place = with_alias(
            Place::synthesize(details.canonical_id.clone(), details.position)?,
            place_id,
        );
        if !options.status.matches(place.status()) {
            return Ok(None);
        }

        Ok(Some(Resolved {
            place,
            details: Some(details),
        }))
    }

    /// Places matching the query, in creation order
    #[instrument(skip(self))]
    pub async fn list(&self, query: &PlaceQuery) -> Result<Vec<Place>, PlaceError> {
        let places = self.store.find(&query.to_filter()).await?;
        debug!(count = places.len(), "Listed places");
        Ok(places)
    }

    /// Fold every matching place's summary into one, without buffering rows
    #[instrument(skip(self))]
    pub async fn aggregate_stats(&self, status: StatusFilter) -> Result<PlaceStats, PlaceError> {
        let filter = PlaceFilter {
            status,
            ..Default::default()
        };

        let mut answers = AnswerSummary::default();
        let mut places = 0_u64;
        let mut rows = self.store.stream(filter);
        while let Some(place) = rows.try_next().await? {
            answers = answers.merge(*place.answer_summary());
            places += 1;
        }

        Ok(PlaceStats { answers, places })
    }

    /// Persist a place, returning it with its new version
    pub async fn save(&self, place: &Place) -> Result<Place, PlaceError> {
        Ok(self.store.save(place).await?)
    }

    /// By id first, then by alias, deleted places included
    async fn find_stored(&self, place_id: &str) -> Result<Option<Place>, PlaceError> {
        if let Some(place) = self.store.find_by_id(place_id, StatusFilter::Any).await? {
            return Ok(Some(place));
        }
        Ok(self
            .store
            .find_by_alias(place_id, StatusFilter::Any)
            .await?)
    }
}

fn with_alias(mut place: Place, requested_id: &str) -> Place {
    place.add_alias(requested_id);
    place
}
