// Place Answers - API Core
//
// Backend for looking up places, answering a yes/no question about each one
// and reading aggregated answer statistics. Every response is a hypermedia
// envelope (see common::hateoas).
//
// Storage and the external places lookup sit behind traits in kernel/ and are
// injected through ServerDeps.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
