//! Place domain actions - business logic functions
//!
//! Actions are async functions called directly from the HTTP handlers.
//! Each one returns a finished response envelope; "not found" is `Ok(None)`.

mod links;
mod mutations;
mod queries;

pub use links::*;
pub use mutations::*;
pub use queries::*;
