//! Geographic primitives: validated positions and the bounds → polygon codec.
//!
//! Bounds arrive as raw northeast/southwest corner components (straight from
//! the query string) and are converted into a closed polygon ring that both
//! the Postgres store and the in-memory store use for containment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failure for a coordinate or a bounds descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GeoError {
    pub field: String,
    pub message: String,
}

impl GeoError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A valid point on the globe.
///
/// Serialized as a `[latitude, longitude]` pair; deserializing re-runs the
/// range checks so an invalid pair can never become a `Position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    latitude: f64,
    longitude: f64,
}

impl Position {
    /// Create a position, rejecting non-finite or out-of-range components.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::new(
                "position",
                format!("Invalid latitude: {latitude}"),
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::new(
                "position",
                format!("Invalid longitude: {longitude}"),
            ));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl TryFrom<[f64; 2]> for Position {
    type Error = GeoError;

    fn try_from([latitude, longitude]: [f64; 2]) -> Result<Self, Self::Error> {
        Position::new(latitude, longitude)
    }
}

impl From<Position> for [f64; 2] {
    fn from(position: Position) -> Self {
        [position.latitude, position.longitude]
    }
}

/// Raw bounds descriptor as received from a caller.
///
/// Each corner is expected to hold exactly two components: latitude then
/// longitude.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundsInput {
    pub ne: Option<Vec<String>>,
    pub sw: Option<Vec<String>>,
}

impl BoundsInput {
    /// Build an input from `"lat,lng"` corner strings.
    ///
    /// Returns `None` when neither corner was supplied, meaning "no bounds".
    pub fn from_pairs(ne: Option<&str>, sw: Option<&str>) -> Option<Self> {
        if ne.is_none() && sw.is_none() {
            return None;
        }

        let split = |value: &str| value.split(',').map(|part| part.trim().to_string()).collect();

        Some(Self {
            ne: ne.map(split),
            sw: sw.map(split),
        })
    }
}

/// Axis-aligned rectangle described by its northeast and southwest corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub ne: Position,
    pub sw: Position,
}

impl GeoBounds {
    /// Validate a raw bounds descriptor.
    ///
    /// Rectangles crossing the antimeridian (`ne.lng < sw.lng`) are not
    /// supported and fail validation.
    pub fn parse(input: &BoundsInput) -> Result<Self, GeoError> {
        let ne = parse_corner(input.ne.as_deref(), "ne")?;
        let sw = parse_corner(input.sw.as_deref(), "sw")?;

        if ne.latitude < sw.latitude {
            return Err(GeoError::new(
                "bounds",
                "Northeast latitude must not be south of southwest latitude",
            ));
        }
        if ne.longitude < sw.longitude {
            return Err(GeoError::new(
                "bounds",
                "Bounds crossing the antimeridian are not supported",
            ));
        }

        Ok(Self { ne, sw })
    }

    /// Closed ring covering the rectangle, in `[longitude, latitude]` order.
    pub fn to_polygon(&self) -> GeoPolygon {
        let (west, south) = (self.sw.longitude, self.sw.latitude);
        let (east, north) = (self.ne.longitude, self.ne.latitude);

        GeoPolygon {
            ring: [
                [west, south],
                [east, south],
                [east, north],
                [west, north],
                [west, south],
            ],
        }
    }
}

fn parse_corner(components: Option<&[String]>, name: &str) -> Result<Position, GeoError> {
    let field = format!("bounds.{name}");
    let components = components
        .ok_or_else(|| GeoError::new(&field, format!("Invalid coordinate array for \"{name}\"")))?;

    if components.len() != 2 {
        return Err(GeoError::new(
            &field,
            format!("Missing latitude and longitude coordinates for \"{name}\""),
        ));
    }

    let mut values = [0.0_f64; 2];
    for (i, component) in components.iter().enumerate() {
        let property = if i == 0 { "latitude" } else { "longitude" };
        values[i] = component
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| {
                GeoError::new(&field, format!("Invalid {property} coordinate for \"{name}\""))
            })?;
    }

    Position::new(values[0], values[1]).map_err(|err| GeoError::new(&field, err.message))
}

/// Closed polygon ring (first vertex == last vertex) of `[longitude, latitude]`
/// pairs, as produced by [`GeoBounds::to_polygon`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPolygon {
    ring: [[f64; 2]; 5],
}

impl GeoPolygon {
    pub fn ring(&self) -> &[[f64; 2]; 5] {
        &self.ring
    }

    /// Inclusive containment test. Points on the boundary are inside.
    ///
    /// The ring is always axis-aligned, so its extent is the rectangle.
    pub fn contains(&self, position: &Position) -> bool {
        let (mut min_lng, mut min_lat) = (f64::INFINITY, f64::INFINITY);
        let (mut max_lng, mut max_lat) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for [lng, lat] in self.ring {
            min_lng = min_lng.min(lng);
            max_lng = max_lng.max(lng);
            min_lat = min_lat.min(lat);
            max_lat = max_lat.max(lat);
        }

        (min_lng..=max_lng).contains(&position.longitude)
            && (min_lat..=max_lat).contains(&position.latitude)
    }

    /// Postgres `polygon` literal, e.g. `((0,0),(10,0),(10,10),(0,10),(0,0))`.
    pub fn to_pg_literal(&self) -> String {
        let points: Vec<String> = self
            .ring
            .iter()
            .map(|[lng, lat]| format!("({lng},{lat})"))
            .collect();
        format!("({})", points.join(","))
    }
}
