use async_trait::async_trait;
use quiz_core::model::{QuizId, ScoreRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A score record together with the quiz it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredScore {
    pub quiz_id: QuizId,
    pub record: ScoreRecord,
}

/// Key-value contract for the latest score per quiz.
///
/// One record per quiz id; writing replaces whatever was stored before.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Fetch the stored record for a quiz, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_score(&self, quiz_id: &QuizId) -> Result<Option<ScoreRecord>, StorageError>;

    /// Persist the record for a quiz, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn put_score(&self, quiz_id: &QuizId, record: &ScoreRecord) -> Result<(), StorageError>;

    /// List every stored record, most recently recorded first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_scores(&self) -> Result<Vec<StoredScore>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    scores: Arc<Mutex<HashMap<QuizId, ScoreRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scores: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ScoreRepository for InMemoryRepository {
    async fn get_score(&self, quiz_id: &QuizId) -> Result<Option<ScoreRecord>, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(quiz_id).cloned())
    }

    async fn put_score(&self, quiz_id: &QuizId, record: &ScoreRecord) -> Result<(), StorageError> {
        let mut guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(quiz_id.clone(), record.clone());
        Ok(())
    }

    async fn list_scores(&self) -> Result<Vec<StoredScore>, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut out: Vec<StoredScore> = guard
            .iter()
            .map(|(quiz_id, record)| StoredScore {
                quiz_id: quiz_id.clone(),
                record: record.clone(),
            })
            .collect();
        out.sort_by(|a, b| {
            b.record
                .recorded_at()
                .cmp(&a.record.recorded_at())
                .then_with(|| a.quiz_id.cmp(&b.quiz_id))
        });
        Ok(out)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub scores: Arc<dyn ScoreRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let scores: Arc<dyn ScoreRepository> = Arc::new(InMemoryRepository::new());
        Self { scores }
    }
}
