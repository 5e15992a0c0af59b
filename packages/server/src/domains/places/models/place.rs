use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::Position;
use crate::domains::places::errors::PlaceError;
use crate::domains::places::models::answer::{Answer, AnswerLedger, AnswerSummary};

/// Place lifecycle status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaceStatus {
    #[default]
    Active,
    Deleted,
}

impl std::fmt::Display for PlaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceStatus::Active => write!(f, "ACTIVE"),
            PlaceStatus::Deleted => write!(f, "DELETED"),
        }
    }
}

impl std::str::FromStr for PlaceStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "ACTIVE" => Ok(PlaceStatus::Active),
            "DELETED" => Ok(PlaceStatus::Deleted),
            _ => Err(anyhow!("Invalid place status: {}", s)),
        }
    }
}

/// Place aggregate - one physical location subject to the yes/no question.
///
/// Fields are private: answers and the summary only change through
/// [`Place::add_answer`], and the position is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    id: String,
    aliases: Vec<String>,
    position: Position,
    status: PlaceStatus,
    ledger: AnswerLedger,
    summary: AnswerSummary,
    created_at: Option<DateTime<Utc>>,
    modified_at: Option<DateTime<Utc>>,
    version: i64,
}

/// Raw persisted state used by stores to rehydrate a [`Place`].
#[derive(Debug, Clone)]
pub struct PlaceParts {
    pub id: String,
    pub aliases: Vec<String>,
    pub position: Position,
    pub status: PlaceStatus,
    pub answers: Vec<Answer>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i64,
}

impl Place {
    /// Create a new, active place with an empty answer ledger.
    pub fn create(
        id: impl Into<String>,
        position: Position,
        alias_of: Option<String>,
    ) -> Result<Self, PlaceError> {
        let now = Utc::now();
        let mut place = Self::new_unchecked(validate_id(id.into())?, position);
        place.created_at = Some(now);
        place.modified_at = Some(now);
        if let Some(alias) = alias_of {
            place.add_alias(alias);
        }
        Ok(place)
    }

    /// Transient place built from external lookup data.
    ///
    /// Carries no audit timestamps and is not persisted until an answer is
    /// added and the place is saved.
    pub fn synthesize(id: impl Into<String>, position: Position) -> Result<Self, PlaceError> {
        Ok(Self::new_unchecked(validate_id(id.into())?, position))
    }

    /// Rehydrate a place from stored state, re-checking the invariants.
    pub fn restore(parts: PlaceParts) -> Result<Self, PlaceError> {
        let id = validate_id(parts.id)?;
        if parts.aliases.iter().any(|alias| alias == &id) {
            return Err(PlaceError::validation(
                "aliases",
                format!("Place {id} lists itself as an alias"),
            ));
        }

        let ledger = AnswerLedger::from_entries(parts.answers);
        let summary = ledger.summarize();

        Ok(Self {
            id,
            aliases: parts.aliases,
            position: parts.position,
            status: parts.status,
            ledger,
            summary,
            created_at: parts.created_at,
            modified_at: parts.modified_at,
            version: parts.version,
        })
    }

    fn new_unchecked(id: String, position: Position) -> Self {
        Self {
            id,
            aliases: Vec::new(),
            position,
            status: PlaceStatus::Active,
            ledger: AnswerLedger::new(),
            summary: AnswerSummary::default(),
            created_at: None,
            modified_at: None,
            version: 0,
        }
    }

    /// Record one answer.
    ///
    /// Fails with [`PlaceError::Conflict`] on a deleted place, leaving the
    /// ledger untouched.
    pub fn add_answer(&mut self, answer: bool) -> Result<(), PlaceError> {
        if self.status == PlaceStatus::Deleted {
            return Err(PlaceError::Conflict(format!("Place {} is deleted", self.id)));
        }

        let now = Utc::now();
        self.ledger.append(answer, now);
        self.summary = self.ledger.summarize();
        self.created_at.get_or_insert(now);
        self.modified_at = Some(now);
        Ok(())
    }

    /// Record another identifier that resolves to this place.
    pub fn add_alias(&mut self, other: impl Into<String>) {
        let other = other.into();
        if other == self.id || self.aliases.contains(&other) {
            return;
        }
        self.aliases.push(other);
    }

    /// Soft-delete. Deleted places accept no further answers.
    pub fn mark_deleted(&mut self) {
        self.status = PlaceStatus::Deleted;
        self.modified_at = Some(Utc::now());
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn status(&self) -> PlaceStatus {
        self.status
    }

    pub fn answers(&self) -> &AnswerLedger {
        &self.ledger
    }

    pub fn answer_summary(&self) -> &AnswerSummary {
        &self.summary
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    /// True for a place synthesized from lookup data and never saved.
    pub fn is_transient(&self) -> bool {
        self.created_at.is_none()
    }

    /// Optimistic concurrency version; 0 means "never stored".
    pub fn version(&self) -> i64 {
        self.version
    }

    pub(crate) fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }
}

fn validate_id(id: String) -> Result<String, PlaceError> {
    if id.trim().is_empty() {
        return Err(PlaceError::validation("placeId", "Place ID must not be empty"));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position() -> Position {
        Position::new(1.0, 2.0).unwrap()
    }

    #[test]
    fn test_create_starts_active_and_empty() {
        let place = Place::create("p1", position(), None).unwrap();

        assert_eq!(place.status(), PlaceStatus::Active);
        assert!(place.answers().is_empty());
        assert_eq!(place.answer_summary().total(), 0);
        assert_eq!(place.answer_summary().dominant(), None);
        assert!(place.created_at().is_some());
        assert!(!place.is_transient());
        assert_eq!(place.version(), 0);
    }

    #[test]
    fn test_create_rejects_empty_id() {
        let err = Place::create("  ", position(), None).unwrap_err();
        assert!(matches!(err, PlaceError::Validation { .. }));
    }

    #[test]
    fn test_add_answer_keeps_summary_consistent() {
        let mut place = Place::create("p1", position(), None).unwrap();

        for (i, answer) in [false, false, true].into_iter().enumerate() {
            place.add_answer(answer).unwrap();
            let summary = place.answer_summary();
            assert_eq!(summary.total() as usize, i + 1);
            assert_eq!(summary.total() as usize, place.answers().len());
        }

        let summary = place.answer_summary();
        assert_eq!(summary.false_count(), 2);
        assert_eq!(summary.true_count(), 1);
        assert_eq!(summary.dominant(), Some(false));
    }

    #[test]
    fn test_add_answer_touches_modified_at() {
        let mut place = Place::create("p1", position(), None).unwrap();
        let before = place.modified_at().unwrap();

        place.add_answer(true).unwrap();

        assert!(place.modified_at().unwrap() >= before);
        assert_eq!(place.created_at().unwrap(), before);
    }

    #[test]
    fn test_deleted_place_rejects_answers() {
        let mut place = Place::create("p1", position(), None).unwrap();
        place.add_answer(true).unwrap();
        place.mark_deleted();

        let err = place.add_answer(false).unwrap_err();

        assert!(matches!(err, PlaceError::Conflict(_)));
        assert_eq!(place.answers().len(), 1);
        assert_eq!(place.answer_summary().total(), 1);
    }

    #[test]
    fn test_alias_rules() {
        let mut place = Place::create("p1", position(), Some("legacy".to_string())).unwrap();
        place.add_alias("p1");
        place.add_alias("legacy");
        place.add_alias("other");

        assert_eq!(place.aliases(), ["legacy".to_string(), "other".to_string()]);
    }

    #[test]
    fn test_synthesized_place_is_transient_until_answered() {
        let mut place = Place::synthesize("p1", position()).unwrap();
        assert!(place.is_transient());

        place.add_answer(true).unwrap();

        assert!(!place.is_transient());
        assert_eq!(place.answer_summary().dominant(), Some(true));
    }

    #[test]
    fn test_restore_recomputes_summary_and_checks_aliases() {
        let parts = PlaceParts {
            id: "p1".to_string(),
            aliases: vec!["p0".to_string()],
            position: position(),
            status: PlaceStatus::Active,
            answers: vec![
                Answer {
                    answer: true,
                    created_at: Utc::now(),
                },
                Answer {
                    answer: true,
                    created_at: Utc::now(),
                },
            ],
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
            version: 4,
        };

        let place = Place::restore(parts.clone()).unwrap();
        assert_eq!(place.answer_summary().true_count(), 2);
        assert_eq!(place.version(), 4);

        let err = Place::restore(PlaceParts {
            aliases: vec!["p1".to_string()],
            ..parts
        })
        .unwrap_err();
        assert!(matches!(err, PlaceError::Validation { .. }));
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!("ACTIVE".parse::<PlaceStatus>().unwrap(), PlaceStatus::Active);
        assert_eq!(PlaceStatus::Deleted.to_string(), "DELETED");
        assert!("active".parse::<PlaceStatus>().is_err());
    }
}
