use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One yes/no answer submitted for a place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer: bool,
    pub created_at: DateTime<Utc>,
}

/// Append-only answer history for one place.
///
/// Entries are never edited or removed; the summary is always derived from
/// the entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerLedger {
    entries: Vec<Answer>,
}

impl AnswerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<Answer>) -> Self {
        Self { entries }
    }

    pub fn append(&mut self, answer: bool, at: DateTime<Utc>) {
        self.entries.push(Answer {
            answer,
            created_at: at,
        });
    }

    pub fn entries(&self) -> &[Answer] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Linear scan over the history. Per-place volume is small.
    pub fn summarize(&self) -> AnswerSummary {
        let true_count = self.entries.iter().filter(|entry| entry.answer).count() as u64;
        let false_count = self.entries.len() as u64 - true_count;
        AnswerSummary::from_counts(false_count, true_count)
    }
}

/// Derived answer counts.
///
/// Serialized as `{ "false", "true", "dominant", "total" }`. `dominant` and
/// `total` are always computed from the two counts; deserializing a summary
/// whose derived fields disagree with its counts fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AnswerSummaryWire")]
pub struct AnswerSummary {
    #[serde(rename = "false")]
    false_count: u64,
    #[serde(rename = "true")]
    true_count: u64,
    dominant: Option<bool>,
    total: u64,
}

impl AnswerSummary {
    pub fn from_counts(false_count: u64, true_count: u64) -> Self {
        Self {
            false_count,
            true_count,
            dominant: dominant_answer(false_count, true_count),
            total: false_count + true_count,
        }
    }

    pub fn false_count(&self) -> u64 {
        self.false_count
    }

    pub fn true_count(&self) -> u64 {
        self.true_count
    }

    /// Majority answer, or `None` on a tie (including no answers at all).
    pub fn dominant(&self) -> Option<bool> {
        self.dominant
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Sum of two summaries with the dominant answer re-derived.
    pub fn merge(self, other: AnswerSummary) -> Self {
        Self::from_counts(
            self.false_count + other.false_count,
            self.true_count + other.true_count,
        )
    }
}

fn dominant_answer(false_count: u64, true_count: u64) -> Option<bool> {
    match true_count.cmp(&false_count) {
        std::cmp::Ordering::Greater => Some(true),
        std::cmp::Ordering::Less => Some(false),
        std::cmp::Ordering::Equal => None,
    }
}

#[derive(Deserialize)]
struct AnswerSummaryWire {
    #[serde(rename = "false")]
    false_count: u64,
    #[serde(rename = "true")]
    true_count: u64,
    #[serde(default)]
    dominant: Option<bool>,
    total: u64,
}

impl TryFrom<AnswerSummaryWire> for AnswerSummary {
    type Error = String;

    fn try_from(wire: AnswerSummaryWire) -> Result<Self, Self::Error> {
        let summary = AnswerSummary::from_counts(wire.false_count, wire.true_count);
        if summary.total != wire.total || summary.dominant != wire.dominant {
            return Err(format!(
                "answer summary is inconsistent: false={} true={} dominant={:?} total={}",
                wire.false_count, wire.true_count, wire.dominant, wire.total
            ));
        }
        Ok(summary)
    }
}
