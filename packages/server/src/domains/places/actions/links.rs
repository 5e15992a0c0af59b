//! Hypermedia link templates for place resources

use crate::common::{EnvelopeBuilder, Link};
use crate::domains::places::data::PlaceData;
use crate::domains::places::models::Place;

/// Listing template; the bounds corners travel as `ne` and `sw`
const PLACES_TEMPLATE: &str = "/places{?ne,sw,dominant,status}";

fn place_href(place_id: &str) -> String {
    format!("/places/{}{{?expand}}", urlencoding::encode(place_id))
}

/// `self` and `add-answer` links for one place
pub fn place_links(place: &Place) -> Vec<Link> {
    vec![
        Link::new(place_href(place.id()), "self"),
        Link::new(
            format!("/places/{}/answers", urlencoding::encode(place.id())),
            "add-answer",
        ),
    ]
}

/// `previous` / `next` links to the neighbours of a list item
pub fn neighbour_links(previous: Option<&Place>, next: Option<&Place>) -> Vec<Link> {
    let previous = previous.map(|place| Link::new(place_href(place.id()), "previous"));
    let next = next.map(|place| Link::new(place_href(place.id()), "next"));
    previous.into_iter().chain(next).collect()
}

pub fn places_links() -> Vec<Link> {
    vec![Link::new(PLACES_TEMPLATE, "self")]
}

pub fn stats_links() -> Vec<Link> {
    vec![Link::new("/stats{?status}", "self")]
}

/// Entry-point links advertised by `GET /`
pub fn root_links() -> Vec<Link> {
    vec![
        Link::new(PLACES_TEMPLATE, "get-places"),
        Link::new("/places/{placeId}{?expand}", "get-place"),
        Link::new("/places/{placeId}/answers", "add-answer"),
        Link::new("/stats{?status}", "get-stats"),
    ]
}

/// Builder pre-filled with the place's fields and its own links
pub fn place_envelope(builder: EnvelopeBuilder, place: &Place) -> EnvelopeBuilder {
    builder
        .body(serde_json::json!(PlaceData::from(place)))
        .links(place_links(place))
}
