//! Static, read-only collection of quizzes supplied at process start.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::model::{Difficulty, Quiz, QuizId};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate quiz id in catalog: {0}")]
    DuplicateId(QuizId),

    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Overview entry for a quiz, as shown on the quiz list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub id: QuizId,
    pub title: String,
    pub description: String,
    pub question_count: usize,
    pub difficulty: String,
    /// Fill level (0-100) for a difficulty meter.
    pub difficulty_level: u8,
    pub estimated_time: String,
}

impl QuizSummary {
    #[must_use]
    pub fn from_quiz(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id().clone(),
            title: quiz.title().to_owned(),
            description: quiz.description().to_owned(),
            question_count: quiz.question_count(),
            difficulty: quiz.difficulty_label().to_owned(),
            difficulty_level: Difficulty::level(quiz.difficulty()),
            estimated_time: quiz.estimated_time().to_owned(),
        }
    }
}

/// Quizzes keyed by id, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct QuizCatalog {
    quizzes: Vec<Arc<Quiz>>,
    index: HashMap<QuizId, usize>,
}

impl QuizCatalog {
    /// Builds a catalog from quizzes in display order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two quizzes share an id.
    pub fn new(quizzes: impl IntoIterator<Item = Quiz>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for quiz in quizzes {
            if catalog.index.contains_key(quiz.id()) {
                return Err(CatalogError::DuplicateId(quiz.id().clone()));
            }
            catalog
                .index
                .insert(quiz.id().clone(), catalog.quizzes.len());
            catalog.quizzes.push(Arc::new(quiz));
        }
        Ok(catalog)
    }

    /// Parses a JSON array of quizzes.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Json` for malformed or invalid quizzes and
    /// `CatalogError::DuplicateId` for repeated ids.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let quizzes: Vec<Quiz> = serde_json::from_str(raw)?;
        Self::new(quizzes)
    }

    #[must_use]
    pub fn get(&self, id: &QuizId) -> Option<Arc<Quiz>> {
        self.index.get(id).map(|&i| Arc::clone(&self.quizzes[i]))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quiz> {
        self.quizzes.iter().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<QuizSummary> {
        self.iter().map(QuizSummary::from_quiz).collect()
    }
}
