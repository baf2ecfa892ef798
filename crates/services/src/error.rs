//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuizId, ScoreRecordError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the quiz session controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("quiz not found: {0}")]
    QuizNotFound(QuizId),
    #[error("cannot submit: {unanswered} question(s) unanswered")]
    IncompleteAnswers { unanswered: usize },
    #[error("{option:?} is not an option of question {question}")]
    UnknownOption { question: usize, option: String },
    #[error("session already submitted")]
    AlreadySubmitted,
    /// The time limit has run out; only the timeout submission is accepted.
    #[error("time limit reached")]
    TimeExpired,
    #[error(transparent)]
    Record(#[from] ScoreRecordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
