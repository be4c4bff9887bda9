//! Question ledger: every question the model has asked, in first-seen order.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use interview_models::{QaPair, QuestionId, QuestionRecord, QuestionUpdate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TrackerError};

/// Outcome of recording a question update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new question was appended.
    Inserted,
    /// An existing question was overwritten in place.
    Updated,
    /// The update had no id and was ignored.
    Rejected,
}

/// Serialized shape of the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerDocument {
    #[serde(default)]
    questions: Vec<QuestionRecord>,
    #[serde(default)]
    current_question: Option<QuestionId>,
}

/// Upsert-only mapping from question id to its record.
///
/// Records are never deleted. Iteration follows the order in which ids were
/// first seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LedgerDocument", into = "LedgerDocument")]
pub struct QuestionLedger {
    records: Vec<QuestionRecord>,
    index: HashMap<QuestionId, usize>,
    current: Option<QuestionId>,
}

impl From<LedgerDocument> for QuestionLedger {
    fn from(doc: LedgerDocument) -> Self {
        let mut ledger = Self::default();
        for record in doc.questions {
            match ledger.index.get(&record.id) {
                Some(&pos) => ledger.records[pos] = record,
                None => {
                    ledger.index.insert(record.id.clone(), ledger.records.len());
                    ledger.records.push(record);
                }
            }
        }
        ledger.current = doc
            .current_question
            .filter(|id| ledger.index.contains_key(id));
        ledger
    }
}

impl From<QuestionLedger> for LedgerDocument {
    fn from(ledger: QuestionLedger) -> Self {
        Self {
            questions: ledger.records,
            current_question: ledger.current,
        }
    }
}

impl QuestionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an update at the current time.
    pub fn record(&mut self, update: &QuestionUpdate) -> RecordOutcome {
        self.record_at(update, Utc::now())
    }

    /// Record an update with an explicit timestamp.
    ///
    /// Unknown ids are appended; known ids are overwritten in place. The
    /// recorded id becomes the current question.
    pub fn record_at(&mut self, update: &QuestionUpdate, now: DateTime<Utc>) -> RecordOutcome {
        let Some(id) = update.id().cloned() else {
            warn!("Ignoring question update without a question_id");
            return RecordOutcome::Rejected;
        };

        let outcome = match self.index.get(&id) {
            Some(&pos) => {
                self.records[pos].apply(update, now);
                RecordOutcome::Updated
            }
            None => {
                self.index.insert(id.clone(), self.records.len());
                self.records
                    .push(QuestionRecord::from_update(id.clone(), update, now));
                RecordOutcome::Inserted
            }
        };

        debug!(question_id = %id, ?outcome, "Recorded question update");
        self.current = Some(id);
        outcome
    }

    /// The most recently recorded (or explicitly advanced to) question.
    pub fn current_question(&self) -> Option<&QuestionId> {
        self.current.as_ref()
    }

    /// The current question's record.
    pub fn current_record(&self) -> Option<&QuestionRecord> {
        self.current.as_ref().and_then(|id| self.get(id))
    }

    /// Move the current-question pointer to a known question.
    pub fn set_current(&mut self, id: &QuestionId) -> Result<()> {
        if !self.index.contains_key(id) {
            return Err(TrackerError::UnknownQuestion(id.to_string()));
        }
        self.current = Some(id.clone());
        Ok(())
    }

    /// Move the pointer to the next unanswered question after the current one.
    pub fn advance_to_next_unanswered(&mut self) -> Option<&QuestionRecord> {
        let next = self.next_unanswered_after(self.current.as_ref())?.id.clone();
        self.current = Some(next.clone());
        self.get(&next)
    }

    /// Look up a record.
    pub fn get(&self, id: &QuestionId) -> Option<&QuestionRecord> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    /// Records in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &QuestionRecord> {
        self.records.iter()
    }

    /// Number of known questions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no question has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of questions with an answer.
    pub fn answered_count(&self) -> usize {
        self.records.iter().filter(|r| r.answer_received).count()
    }

    /// Answered / total; 0 for an empty ledger.
    pub fn answered_ratio(&self) -> f64 {
        if self.records.is_empty() {
            0.0
        } else {
            self.answered_count() as f64 / self.records.len() as f64
        }
    }

    /// Answered questions in first-seen order.
    pub fn answered(&self) -> impl Iterator<Item = &QuestionRecord> {
        self.records.iter().filter(|r| r.answer_received)
    }

    /// Unanswered questions in first-seen order.
    pub fn unanswered(&self) -> impl Iterator<Item = &QuestionRecord> {
        self.records.iter().filter(|r| !r.answer_received)
    }

    /// Mean answer-quality weight over all questions (0.0-1.0).
    pub fn quality_score(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let total: f64 = self.records.iter().map(|r| r.answer_quality.weight()).sum();
        total / self.records.len() as f64
    }

    /// Next unanswered question after `from`, wrapping around.
    ///
    /// The question at `from` itself is never returned. With no starting
    /// point the first unanswered question is returned.
    pub fn next_unanswered_after(&self, from: Option<&QuestionId>) -> Option<&QuestionRecord> {
        let start = from
            .and_then(|id| self.index.get(id))
            .map(|&pos| pos + 1)
            .unwrap_or(0);
        let n = self.records.len();
        (0..n)
            .map(|offset| &self.records[(start + offset) % n])
            .find(|r| !r.answer_received && Some(&r.id) != from)
    }

    /// Answered questions with a non-empty response, as export rows.
    pub fn qa_pairs(&self) -> Vec<QaPair> {
        self.answered()
            .filter(|r| !r.user_response.trim().is_empty())
            .map(|r| QaPair {
                question: if r.text.is_empty() {
                    r.id.to_string()
                } else {
                    r.text.clone()
                },
                answer: r.user_response.clone(),
            })
            .collect()
    }

    /// Multi-line listing of every question's state.
    pub fn debug_status(&self) -> String {
        let mut out = format!(
            "Questions: {} total, {} answered ({:.0}%), quality {:.2}\n",
            self.len(),
            self.answered_count(),
            self.answered_ratio() * 100.0,
            self.quality_score()
        );
        for record in &self.records {
            let marker = if self.current.as_ref() == Some(&record.id) {
                ">"
            } else {
                " "
            };
            let _ = writeln!(
                out,
                "{} [{}] {} ({}) {}: {}",
                marker,
                if record.answer_received { "x" } else { " " },
                record.id,
                record.topic,
                record.answer_quality,
                record.text
            );
        }
        out
    }
}
