use async_trait::async_trait;
use quiz_core::model::{QuizId, ScoreRecord};

use super::SqliteRepository;
use super::mapping::{map_score_row, map_stored_score_row};
use crate::repository::{ScoreRepository, StorageError, StoredScore};

#[async_trait]
impl ScoreRepository for SqliteRepository {
    async fn get_score(&self, quiz_id: &QuizId) -> Result<Option<ScoreRecord>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT score, total, percentage, recorded_at, previous_score
                FROM quiz_scores
                WHERE quiz_id = ?1
            ",
        )
        .bind(quiz_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_score_row).transpose()
    }

    async fn put_score(&self, quiz_id: &QuizId, record: &ScoreRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO quiz_scores (
                    quiz_id, score, total, percentage, recorded_at, previous_score
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(quiz_id) DO UPDATE SET
                    score = excluded.score,
                    total = excluded.total,
                    percentage = excluded.percentage,
                    recorded_at = excluded.recorded_at,
                    previous_score = excluded.previous_score
            ",
        )
        .bind(quiz_id.as_str())
        .bind(i64::from(record.score()))
        .bind(i64::from(record.total()))
        .bind(record.percentage())
        .bind(record.recorded_at())
        .bind(record.previous_score().map(i64::from))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn list_scores(&self) -> Result<Vec<StoredScore>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT quiz_id, score, total, percentage, recorded_at, previous_score
                FROM quiz_scores
                ORDER BY recorded_at DESC, quiz_id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_stored_score_row(&row)?);
        }
        Ok(out)
    }
}
