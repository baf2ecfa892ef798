use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::quiz::Quiz;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreRecordError {
    #[error("score record must cover at least one question")]
    EmptyTotal,

    #[error("score ({score}) exceeds total questions ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },
}

/// Percentage of `score` out of `total`, in `[0, 100]`.
///
/// A zero total yields `0.0`.
#[must_use]
pub fn percentage(score: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(score) / f64::from(total) * 100.0
}

/// Counts answers that match the correct option of their question.
///
/// Unset slots never count. Slots past the end of `answers` are unset.
#[must_use]
pub fn count_correct(quiz: &Quiz, answers: &[Option<String>]) -> u32 {
    let correct = quiz
        .questions()
        .iter()
        .enumerate()
        .filter(|(i, q)| q.is_correct(answers.get(*i).and_then(Option::as_deref)))
        .count();
    u32::try_from(correct).unwrap_or(u32::MAX)
}

//
// ─── SCORE RECORD ──────────────────────────────────────────────────────────────
//

/// Persisted outcome of the latest attempt at a quiz, plus the score before it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    score: u32,
    total: u32,
    percentage: f64,
    recorded_at: DateTime<Utc>,
    previous_score: Option<u32>,
}

impl ScoreRecord {
    /// Rehydrate a record from persisted storage.
    ///
    /// The percentage is derived from `score` and `total` rather than trusted.
    ///
    /// # Errors
    ///
    /// Returns `ScoreRecordError` if `total` is zero or `score > total`.
    pub fn from_persisted(
        score: u32,
        total: u32,
        recorded_at: DateTime<Utc>,
        previous_score: Option<u32>,
    ) -> Result<Self, ScoreRecordError> {
        if total == 0 {
            return Err(ScoreRecordError::EmptyTotal);
        }
        if score > total {
            return Err(ScoreRecordError::ScoreExceedsTotal { score, total });
        }
        Ok(Self {
            score,
            total,
            percentage: percentage(score, total),
            recorded_at,
            previous_score,
        })
    }

    /// Build the record for a new attempt, carrying the previous record's score forward.
    ///
    /// # Errors
    ///
    /// Returns `ScoreRecordError` if `total` is zero or `score > total`.
    pub fn for_attempt(
        score: u32,
        total: u32,
        recorded_at: DateTime<Utc>,
        previous: Option<&ScoreRecord>,
    ) -> Result<Self, ScoreRecordError> {
        Self::from_persisted(score, total, recorded_at, previous.map(ScoreRecord::score))
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    #[must_use]
    pub fn previous_score(&self) -> Option<u32> {
        self.previous_score
    }
}

//
// ─── COMPARISON ────────────────────────────────────────────────────────────────
//

/// Delta between the current attempt and the previous record for the same quiz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub score_delta: i64,
    pub percentage_delta: f64,
    /// Strictly better score; a tie is not an improvement.
    pub improved: bool,
    pub previous_score: u32,
    pub previous_percentage: f64,
}

impl Comparison {
    #[must_use]
    pub fn between(current: &ScoreRecord, previous: &ScoreRecord) -> Self {
        let score_delta = i64::from(current.score()) - i64::from(previous.score());
        Self {
            score_delta,
            percentage_delta: current.percentage() - previous.percentage(),
            improved: score_delta > 0,
            previous_score: previous.score(),
            previous_percentage: previous.percentage(),
        }
    }
}

/// Result of submitting a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub score: u32,
    pub total: u32,
    pub percentage: f64,
    pub comparison: Option<Comparison>,
    pub record: ScoreRecord,
}

impl ScoreResult {
    #[must_use]
    pub fn new(record: ScoreRecord, previous: Option<&ScoreRecord>) -> Self {
        Self {
            score: record.score(),
            total: record.total(),
            percentage: record.percentage(),
            comparison: previous.map(|prev| Comparison::between(&record, prev)),
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn percentage_of_two_thirds() {
        assert!(close(percentage(2, 3), 66.7));
        assert!(close(percentage(3, 3), 100.0));
        assert!(close(percentage(0, 0), 0.0));
    }

    #[test]
    fn record_rejects_inconsistent_counts() {
        assert_eq!(
            ScoreRecord::from_persisted(4, 3, fixed_now(), None).unwrap_err(),
            ScoreRecordError::ScoreExceedsTotal { score: 4, total: 3 }
        );
        assert_eq!(
            ScoreRecord::from_persisted(0, 0, fixed_now(), None).unwrap_err(),
            ScoreRecordError::EmptyTotal
        );
    }

    #[test]
    fn attempt_carries_previous_score_including_zero() {
        let first = ScoreRecord::for_attempt(0, 3, fixed_now(), None).unwrap();
        assert_eq!(first.previous_score(), None);

        let second = ScoreRecord::for_attempt(2, 3, fixed_now(), Some(&first)).unwrap();
        assert_eq!(second.previous_score(), Some(0));
    }

    #[test]
    fn comparison_two_thirds_to_full() {
        let first = ScoreRecord::for_attempt(2, 3, fixed_now(), None).unwrap();
        let second = ScoreRecord::for_attempt(3, 3, fixed_now(), Some(&first)).unwrap();
        let cmp = Comparison::between(&second, &first);

        assert_eq!(cmp.score_delta, 1);
        assert!(close(cmp.percentage_delta, 33.3));
        assert!(cmp.improved);
        assert_eq!(cmp.previous_score, 2);
    }

    #[test]
    fn tie_is_not_an_improvement() {
        let first = ScoreRecord::for_attempt(2, 3, fixed_now(), None).unwrap();
        let second = ScoreRecord::for_attempt(2, 3, fixed_now(), Some(&first)).unwrap();
        let cmp = Comparison::between(&second, &first);
        assert_eq!(cmp.score_delta, 0);
        assert!(!cmp.improved);

        let third = ScoreRecord::for_attempt(1, 3, fixed_now(), Some(&second)).unwrap();
        let cmp = Comparison::between(&third, &second);
        assert_eq!(cmp.score_delta, -1);
        assert!(!cmp.improved);
    }
}
