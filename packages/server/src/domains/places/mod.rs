pub mod actions;
pub mod data;
pub mod errors;
pub mod models;
pub mod repository;

pub use actions::*;
pub use data::*;
pub use errors::PlaceError;
pub use models::*;
pub use repository::{PlaceQuery, PlaceRepository, Resolved, ResolveOptions};
