use quiz_core::model::{QuizId, ScoreRecord};
use sqlx::Row;

use crate::repository::{StorageError, StoredScore};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn quiz_id_from_str(raw: String) -> Result<QuizId, StorageError> {
    QuizId::new(raw).map_err(ser)
}

/// Maps a `quiz_scores` row into a domain record.
///
/// The stored percentage column is informational; the domain recomputes it.
pub(crate) fn map_score_row(row: &sqlx::sqlite::SqliteRow) -> Result<ScoreRecord, StorageError> {
    let score = u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?;
    let recorded_at = row.try_get("recorded_at").map_err(ser)?;
    let previous_score = row
        .try_get::<Option<i64>, _>("previous_score")
        .map_err(ser)?
        .map(|v| u32_from_i64("previous_score", v))
        .transpose()?;

    ScoreRecord::from_persisted(score, total, recorded_at, previous_score).map_err(ser)
}

pub(crate) fn map_stored_score_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<StoredScore, StorageError> {
    let quiz_id = quiz_id_from_str(row.try_get::<String, _>("quiz_id").map_err(ser)?)?;
    Ok(StoredScore {
        quiz_id,
        record: map_score_row(row)?,
    })
}
