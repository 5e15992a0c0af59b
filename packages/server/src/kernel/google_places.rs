use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

use super::{BasePlacesLookup, PlaceDetails};
use crate::common::Position;

const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const DETAILS_FIELDS: &str =
    "place_id,geometry/location,formatted_address,name,formatted_phone_number,rating,url";

/// Google Places Details API response
#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    result: Option<DetailsResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    place_id: String,
    geometry: Geometry,
    formatted_address: Option<String>,
    name: Option<String>,
    formatted_phone_number: Option<String>,
    rating: Option<f64>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl DetailsResponse {
    fn into_details(self, place_id: &str) -> Result<Option<PlaceDetails>> {
        match self.status.as_str() {
            "OK" => {}
            // An unknown or malformed id is "not found", not an outage
            "NOT_FOUND" | "ZERO_RESULTS" | "INVALID_REQUEST" => return Ok(None),
            status => {
                return Err(anyhow!(
                    "Places API returned {} for {}: {}",
                    status,
                    place_id,
                    self.error_message.unwrap_or_default()
                ))
            }
        }

        let result = self
            .result
            .ok_or_else(|| anyhow!("Places API returned OK without a result for {}", place_id))?;
        let position = Position::new(result.geometry.location.lat, result.geometry.location.lng)
            .context("Places API returned an invalid location")?;

        Ok(Some(PlaceDetails {
            canonical_id: result.place_id,
            position,
            formatted_address: result.formatted_address,
            name: result.name,
            phone_number: result.formatted_phone_number,
            rating: result.rating,
            url: result.url,
        }))
    }
}

/// Google Places API client for place details
pub struct GooglePlacesClient {
    api_key: String,
    client: reqwest::Client,
}

impl GooglePlacesClient {
    /// Create a new Google Places client
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { api_key, client })
    }
}

#[async_trait]
impl BasePlacesLookup for GooglePlacesClient {
    #[instrument(skip(self))]
    async fn find_by_id(&self, place_id: &str) -> Result<Option<PlaceDetails>> {
        debug!("Fetching place details");

        let response: DetailsResponse = self
            .client
            .get(DETAILS_URL)
            .query(&[
                ("placeid", place_id),
                ("fields", DETAILS_FIELDS),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Places API request failed");
                anyhow!("Places API request failed: {}", e)
            })?
            .error_for_status()
            .context("Places API returned an error status")?
            .json()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to parse Places API response");
                anyhow!("Failed to parse Places API response: {}", e)
            })?;

        let details = response.into_details(place_id)?;
        if details.is_none() {
            warn!("Place not found by Places API");
        }
        Ok(details)
    }
}

/// Lookup used when no API key is configured: every id is unknown.
pub struct DisabledPlacesLookup;

#[async_trait]
impl BasePlacesLookup for DisabledPlacesLookup {
    async fn find_by_id(&self, _place_id: &str) -> Result<Option<PlaceDetails>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<Option<PlaceDetails>> {
        serde_json::from_value::<DetailsResponse>(value)
            .unwrap()
            .into_details("ChIJ-requested")
    }

    #[test]
    fn test_ok_response_maps_every_field() {
        let details = parse(json!({
            "status": "OK",
            "result": {
                "place_id": "ChIJ-canonical",
                "geometry": { "location": { "lat": -33.87, "lng": 151.21 } },
                "formatted_address": "1 Example St",
                "name": "Example Cafe",
                "formatted_phone_number": "(02) 1234 5678",
                "rating": 4.5,
                "url": "https://maps.google.com/?cid=1"
            }
        }))
        .unwrap()
        .unwrap();

        assert_eq!(details.canonical_id, "ChIJ-canonical");
        assert_eq!(details.position, Position::new(-33.87, 151.21).unwrap());
        assert_eq!(details.name.as_deref(), Some("Example Cafe"));
        assert_eq!(details.phone_number.as_deref(), Some("(02) 1234 5678"));
        assert_eq!(details.rating, Some(4.5));
    }

    #[test]
    fn test_optional_fields_may_be_missing() {
        let details = parse(json!({
            "status": "OK",
            "result": {
                "place_id": "p",
                "geometry": { "location": { "lat": 1.0, "lng": 2.0 } }
            }
        }))
        .unwrap()
        .unwrap();

        assert!(details.rating.is_none());
        assert!(details.url.is_none());
    }

    #[test]
    fn test_not_found_is_none() {
        assert!(parse(json!({ "status": "NOT_FOUND" })).unwrap().is_none());
        assert!(parse(json!({ "status": "INVALID_REQUEST" })).unwrap().is_none());
    }

    #[test]
    fn test_other_statuses_are_errors() {
        let err = parse(json!({
            "status": "OVER_QUERY_LIMIT",
            "error_message": "quota"
        }))
        .unwrap_err();

        assert!(err.to_string().contains("OVER_QUERY_LIMIT"));
    }

    #[tokio::test]
    async fn test_disabled_lookup_knows_nothing() {
        assert!(DisabledPlacesLookup.find_by_id("any").await.unwrap().is_none());
    }
}
