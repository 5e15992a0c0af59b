use crate::common::GeoPolygon;
use crate::domains::places::models::place::{Place, PlaceStatus};

/// Status restriction applied to every store read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    /// Everything except `DELETED` places.
    #[default]
    NotDeleted,
    /// Exactly one status.
    Only(PlaceStatus),
    /// No restriction. Internal use only.
    Any,
}

impl StatusFilter {
    pub fn matches(&self, status: PlaceStatus) -> bool {
        match self {
            StatusFilter::NotDeleted => status != PlaceStatus::Deleted,
            StatusFilter::Only(expected) => status == *expected,
            StatusFilter::Any => true,
        }
    }

    pub fn includes_deleted(&self) -> bool {
        self.matches(PlaceStatus::Deleted)
    }
}

impl From<Option<PlaceStatus>> for StatusFilter {
    fn from(status: Option<PlaceStatus>) -> Self {
        status.map_or(StatusFilter::NotDeleted, StatusFilter::Only)
    }
}

/// Store-level filter composed by the place repository.
///
/// Filters combine with AND. A `dominant` filter never matches a tied place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceFilter {
    pub status: StatusFilter,
    pub within: Option<GeoPolygon>,
    pub dominant: Option<bool>,
}

impl PlaceFilter {
    pub fn matches(&self, place: &Place) -> bool {
        self.status.matches(place.status())
            && self
                .within
                .map_or(true, |polygon| polygon.contains(&place.position()))
            && self
                .dominant
                .map_or(true, |dominant| place.answer_summary().dominant() == Some(dominant))
    }
}
