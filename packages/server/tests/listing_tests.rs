//! Integration tests for listing places and aggregating stats.

mod common;

use common::*;
use places_core::common::{BoundsInput, GeoBounds};
use places_core::domains::places::{
    get_stats, list_places, PlaceQuery, PlaceRepository, PlaceStatus, StatusFilter,
};
use places_core::kernel::MockPlacesLookup;
use serde_json::json;

fn bounds(ne: &str, sw: &str) -> GeoBounds {
    GeoBounds::parse(&BoundsInput::from_pairs(Some(ne), Some(sw)).unwrap()).unwrap()
}

fn content(envelope: &places_core::common::Envelope) -> Vec<serde_json::Value> {
    envelope
        .get("content")
        .and_then(|value| value.as_array())
        .cloned()
        .unwrap_or_default()
}

fn ids(items: &[serde_json::Value]) -> Vec<&str> {
    items
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn bounds_select_only_contained_places() {
    let test = deps_with(
        vec![
            place_with_answers("p1", 1.0, 1.0, &[true]),
            place_with_answers("p2", 5.0, 5.0, &[]),
        ],
        MockPlacesLookup::new(),
    );

    let query = PlaceQuery {
        bounds: Some(bounds("2,2", "0,0")),
        ..Default::default()
    };
    let envelope = list_places(query, &test.server_deps()).await.unwrap();
    let items = content(&envelope);

    assert_eq!(ids(&items), ["p1"]);
    let rels: Vec<&str> = items[0]["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|link| link["rel"].as_str().unwrap())
        .collect();
    assert_eq!(rels, ["self", "add-answer"]);

    assert_eq!(
        envelope.link("self").unwrap().href,
        "https://api.test/places{?ne,sw,dominant,status}"
    );
}

#[tokio::test]
async fn items_link_to_their_neighbours() {
    let test = deps_with(
        vec![
            place_with_answers("a", 0.0, 0.0, &[]),
            place_with_answers("b", 0.0, 0.0, &[]),
            place_with_answers("c", 0.0, 0.0, &[]),
        ],
        MockPlacesLookup::new(),
    );

    let envelope = list_places(PlaceQuery::default(), &test.server_deps())
        .await
        .unwrap();
    let items = content(&envelope);
    assert_eq!(ids(&items), ["a", "b", "c"]);

    let link = |item: &serde_json::Value, rel: &str| {
        item["links"]
            .as_array()
            .unwrap()
            .iter()
            .find(|link| link["rel"] == rel)
            .map(|link| link["href"].as_str().unwrap().to_string())
    };

    assert_eq!(link(&items[0], "previous"), None);
    assert_eq!(
        link(&items[0], "next").as_deref(),
        Some("https://api.test/places/b{?expand}")
    );
    assert_eq!(
        link(&items[1], "previous").as_deref(),
        Some("https://api.test/places/a{?expand}")
    );
    assert_eq!(link(&items[2], "next"), None);
}

#[tokio::test]
async fn dominant_filter_excludes_ties() {
    let test = deps_with(
        vec![
            place_with_answers("yes", 0.0, 0.0, &[true, true, false]),
            place_with_answers("tie", 0.0, 0.0, &[true, false]),
            place_with_answers("no", 0.0, 0.0, &[false]),
            place_with_answers("empty", 0.0, 0.0, &[]),
        ],
        MockPlacesLookup::new(),
    );
    let deps = test.server_deps();

    let only_true = list_places(
        PlaceQuery {
            dominant: Some(true),
            ..Default::default()
        },
        &deps,
    )
    .await
    .unwrap();
    assert_eq!(ids(&content(&only_true)), ["yes"]);

    let only_false = list_places(
        PlaceQuery {
            dominant: Some(false),
            ..Default::default()
        },
        &deps,
    )
    .await
    .unwrap();
    assert_eq!(ids(&content(&only_false)), ["no"]);
}

#[tokio::test]
async fn deleted_places_are_hidden_by_default() {
    let mut gone = place_with_answers("gone", 0.0, 0.0, &[true]);
    gone.mark_deleted();
    let test = deps_with(
        vec![place_with_answers("here", 0.0, 0.0, &[]), gone],
        MockPlacesLookup::new(),
    );
    let deps = test.server_deps();

    let envelope = list_places(PlaceQuery::default(), &deps).await.unwrap();
    assert_eq!(ids(&content(&envelope)), ["here"]);

    let envelope = list_places(
        PlaceQuery {
            status: Some(PlaceStatus::Active),
            ..Default::default()
        },
        &deps,
    )
    .await
    .unwrap();
    assert_eq!(ids(&content(&envelope)), ["here"]);
}

#[tokio::test]
async fn empty_result_still_has_content_list() {
    let test = deps_with(vec![], MockPlacesLookup::new());

    let envelope = list_places(PlaceQuery::default(), &test.server_deps())
        .await
        .unwrap();

    assert_eq!(envelope.get("content"), Some(&json!([])));
}

#[tokio::test]
async fn stats_sum_every_visible_place() {
    let mut gone = place_with_answers("gone", 0.0, 0.0, &[true, true, true]);
    gone.mark_deleted();
    let test = deps_with(
        vec![
            place_with_answers("a", 0.0, 0.0, &[true, false, false]),
            place_with_answers("b", 1.0, 1.0, &[true, true]),
            gone,
        ],
        MockPlacesLookup::new(),
    );
    let deps = test.server_deps();

    let envelope = get_stats(StatusFilter::default(), &deps).await.unwrap();
    assert_eq!(envelope.get("answers"), Some(&summary(2, 3, Some(true))));
    assert_eq!(envelope.get("places"), Some(&json!(2)));
    assert_eq!(envelope.link("self").unwrap().href, "https://api.test/stats{?status}");

    let stats = PlaceRepository::new(&deps)
        .aggregate_stats(StatusFilter::Any)
        .await
        .unwrap();
    assert_eq!(stats.places, 3);
    assert_eq!(stats.answers.total(), 8);
}

#[tokio::test]
async fn stats_over_no_places_are_empty() {
    let test = deps_with(vec![], MockPlacesLookup::new());

    let envelope = get_stats(StatusFilter::default(), &test.server_deps())
        .await
        .unwrap();

    assert_eq!(envelope.get("answers"), Some(&summary(0, 0, None)));
    assert_eq!(envelope.get("places"), Some(&json!(0)));
}
