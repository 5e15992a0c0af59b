pub mod answer;
pub mod filter;
pub mod place;

pub use answer::{Answer, AnswerLedger, AnswerSummary};
pub use filter::{PlaceFilter, StatusFilter};
pub use place::{Place, PlaceParts, PlaceStatus};
