pub mod place;

pub use place::{AnswerInput, PlaceData, PlaceStats};
