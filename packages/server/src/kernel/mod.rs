//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod google_places;
pub mod postgres_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use google_places::{DisabledPlacesLookup, GooglePlacesClient};
pub use postgres_store::PostgresPlaceStore;
pub use test_dependencies::{InMemoryPlaceStore, MockPlacesLookup, TestDependencies};
pub use traits::*;
