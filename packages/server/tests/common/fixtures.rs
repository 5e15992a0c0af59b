//! Test fixtures for building places, lookup records and dependencies.

use places_core::common::{Envelope, Position};
use places_core::domains::places::Place;
use places_core::kernel::{InMemoryPlaceStore, MockPlacesLookup, PlaceDetails, TestDependencies};
use serde_json::{json, Value};

pub fn position(latitude: f64, longitude: f64) -> Position {
    Position::new(latitude, longitude).expect("valid test position")
}

/// A stored place with the given answers already recorded
pub fn place_with_answers(id: &str, latitude: f64, longitude: f64, answers: &[bool]) -> Place {
    let mut place = Place::create(id, position(latitude, longitude), None).expect("valid place");
    for answer in answers {
        place.add_answer(*answer).expect("active place accepts answers");
    }
    place
}

/// A lookup record with every descriptive field filled in
pub fn details(canonical_id: &str, latitude: f64, longitude: f64) -> PlaceDetails {
    PlaceDetails {
        canonical_id: canonical_id.to_string(),
        position: position(latitude, longitude),
        formatted_address: Some("1 Example Street".to_string()),
        name: Some("Example Cafe".to_string()),
        phone_number: Some("(555) 010-0000".to_string()),
        rating: Some(4.2),
        url: Some(format!("https://maps.example.com/?place={canonical_id}")),
    }
}

pub fn deps_with(places: Vec<Place>, lookup: MockPlacesLookup) -> TestDependencies {
    let store = places
        .into_iter()
        .fold(InMemoryPlaceStore::new(), |store, place| store.with_place(place));
    TestDependencies::with(store, lookup)
}

pub fn summary(false_count: u64, true_count: u64, dominant: Option<bool>) -> Value {
    json!({
        "false": false_count,
        "true": true_count,
        "dominant": dominant,
        "total": false_count + true_count,
    })
}

pub fn rels(envelope: &Envelope) -> Vec<&str> {
    envelope.links.iter().map(|link| link.rel.as_str()).collect()
}
