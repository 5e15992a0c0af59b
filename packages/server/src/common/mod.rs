// Common types and utilities shared across the application

pub mod geo;
pub mod hateoas;

pub use geo::{BoundsInput, GeoBounds, GeoError, GeoPolygon, Position};
pub use hateoas::{Envelope, EnvelopeBuilder, ErrorDescriptor, Link};
