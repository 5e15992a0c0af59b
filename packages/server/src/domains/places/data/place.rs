use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::Position;
use crate::domains::places::errors::PlaceError;
use crate::domains::places::models::{Answer, AnswerSummary, Place, PlaceParts, PlaceStatus};

/// External representation of a place.
///
/// `answers` is `null` for a transient place synthesized from lookup data.
/// The internal version counter is never exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceData {
    pub id: String,
    pub aliases: Vec<String>,
    pub position: Position,
    pub status: PlaceStatus,
    pub answers: Option<Vec<Answer>>,
    pub answer_summary: AnswerSummary,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<&Place> for PlaceData {
    fn from(place: &Place) -> Self {
        Self {
            id: place.id().to_string(),
            aliases: place.aliases().to_vec(),
            position: place.position(),
            status: place.status(),
            answers: (!place.is_transient()).then(|| place.answers().entries().to_vec()),
            answer_summary: *place.answer_summary(),
            created_at: place.created_at(),
            modified_at: place.modified_at(),
        }
    }
}

impl PlaceData {
    /// Parse the external representation back into an aggregate.
    ///
    /// The summary must agree with the answer list.
    pub fn into_place(self) -> Result<Place, PlaceError> {
        let place = Place::restore(PlaceParts {
            id: self.id,
            aliases: self.aliases,
            position: self.position,
            status: self.status,
            answers: self.answers.unwrap_or_default(),
            created_at: self.created_at,
            modified_at: self.modified_at,
            version: 0,
        })?;

        if *place.answer_summary() != self.answer_summary {
            return Err(PlaceError::validation(
                "answerSummary",
                "Answer summary does not match the answer list",
            ));
        }

        Ok(place)
    }
}

/// Answer submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnswerInput {
    pub answer: bool,
    /// Used to create the place when neither the store nor the lookup knows it.
    pub position: Option<Position>,
}

/// Answer totals across every place matching a status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceStats {
    pub answers: AnswerSummary,
    pub places: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let mut place = Place::create("p1", Position::new(1.0, 2.0).unwrap(), None).unwrap();
        place.add_answer(true).unwrap();

        let json = serde_json::to_value(PlaceData::from(&place)).unwrap();

        assert_eq!(json["id"], json!("p1"));
        assert_eq!(json["position"], json!([1.0, 2.0]));
        assert_eq!(json["status"], json!("ACTIVE"));
        assert_eq!(
            json["answerSummary"],
            json!({ "false": 0, "true": 1, "dominant": true, "total": 1 })
        );
        assert_eq!(json["answers"].as_array().unwrap().len(), 1);
        assert!(json.get("version").is_none());
    }

    #[test]
    fn test_transient_place_renders_null_answers() {
        let place = Place::synthesize("p1", Position::new(1.0, 2.0).unwrap()).unwrap();
        let json = serde_json::to_value(PlaceData::from(&place)).unwrap();

        assert!(json["answers"].is_null());
        assert!(json["createdAt"].is_null());
    }

    #[test]
    fn test_render_then_parse_is_idempotent() {
        let mut place = Place::create("p1", Position::new(-33.87, 151.21).unwrap(), None).unwrap();
        place.add_alias("ChIJ-old");
        place.add_answer(false).unwrap();
        place.add_answer(true).unwrap();
        place.add_answer(false).unwrap();

        let json = serde_json::to_string(&PlaceData::from(&place)).unwrap();
        let parsed = serde_json::from_str::<PlaceData>(&json)
            .unwrap()
            .into_place()
            .unwrap();

        assert_eq!(parsed.id(), place.id());
        assert_eq!(parsed.position(), place.position());
        assert_eq!(parsed.answer_summary(), place.answer_summary());
        assert_eq!(parsed.aliases(), place.aliases());
    }

    #[test]
    fn test_parse_rejects_mismatched_summary() {
        let place = Place::create("p1", Position::new(1.0, 2.0).unwrap(), None).unwrap();
        let mut data = PlaceData::from(&place);
        data.answer_summary = AnswerSummary::from_counts(0, 1);

        assert!(data.into_place().is_err());
    }
}
