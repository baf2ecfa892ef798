use chrono::{DateTime, Utc};

use quiz_core::model::QuizId;
use storage::repository::StoredScore;

/// Presentation-agnostic row of the score history.
///
/// Carries raw numbers and timestamps; the host formats them.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreHistoryItem {
    pub quiz_id: QuizId,
    /// `None` when the quiz is no longer in the catalog.
    pub title: Option<String>,
    pub score: u32,
    pub total: u32,
    pub percentage: f64,
    pub recorded_at: DateTime<Utc>,
    pub previous_score: Option<u32>,
}

impl ScoreHistoryItem {
    #[must_use]
    pub fn from_stored(stored: &StoredScore, title: Option<String>) -> Self {
        let record = &stored.record;
        Self {
            quiz_id: stored.quiz_id.clone(),
            title,
            score: record.score(),
            total: record.total(),
            percentage: record.percentage(),
            recorded_at: record.recorded_at(),
            previous_score: record.previous_score(),
        }
    }
}
