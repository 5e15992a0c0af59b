//! Place query actions

use serde_json::json;
use tracing::{debug, instrument};

use super::links::{neighbour_links, place_envelope, places_links, stats_links};
use crate::common::{Envelope, Link};
use crate::domains::places::errors::PlaceError;
use crate::domains::places::models::StatusFilter;
use crate::domains::places::repository::{PlaceQuery, PlaceRepository, ResolveOptions};
use crate::kernel::ServerDeps;

/// All places matching the query as `{ content: [...] }`.
///
/// Each item links to its neighbours in the filtered result set.
#[instrument(skip(deps))]
pub async fn list_places(query: PlaceQuery, deps: &ServerDeps) -> Result<Envelope, PlaceError> {
    let places = PlaceRepository::new(deps).list(&query).await?;
    let builder = deps.envelope();

    let content: Vec<Envelope> = places
        .iter()
        .enumerate()
        .map(|(index, place)| {
            let previous = index.checked_sub(1).and_then(|i| places.get(i));
            place_envelope(builder.fork(), place)
                .links(neighbour_links(previous, places.get(index + 1)))
                .build()
        })
        .collect();

    Ok(builder
        .body(json!({ "content": content }))
        .links(places_links())
        .build())
}

/// A single place, optionally expanded with lookup details
#[instrument(skip(deps))]
pub async fn get_place(
    place_id: &str,
    options: ResolveOptions,
    deps: &ServerDeps,
) -> Result<Option<Envelope>, PlaceError> {
    let Some(resolved) = PlaceRepository::new(deps).resolve(place_id, options).await? else {
        return Ok(None);
    };

    let details = resolved.details.filter(|_| options.expand);
    if options.expand && details.is_none() {
        debug!(place_id = %place_id, "No lookup details to expand");
    }

    let envelope = place_envelope(deps.envelope(), &resolved.place)
        .when_some(details, |builder, details| {
            builder
                .body(json!({
                    "address": details.formatted_address,
                    "name": details.name,
                    "phoneNumber": details.phone_number,
                    "rating": details.rating,
                }))
                .when_some(details.url, |builder, url| {
                    builder.link(Link::new(url, "open-place"))
                })
        })
        .build();

    Ok(Some(envelope))
}

/// Answer totals across all places matching the status filter
#[instrument(skip(deps))]
pub async fn get_stats(status: StatusFilter, deps: &ServerDeps) -> Result<Envelope, PlaceError> {
    let stats = PlaceRepository::new(deps).aggregate_stats(status).await?;

    Ok(deps
        .envelope()
        .body(json!({
            "answers": stats.answers,
            "places": stats.places,
        }))
        .links(stats_links())
        .build())
}
