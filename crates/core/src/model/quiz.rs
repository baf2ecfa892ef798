use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::model::ids::QuizId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("quiz must contain at least one question")]
    NoQuestions,

    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must offer at least one option")]
    NoOptions,

    #[error("option text cannot be empty")]
    EmptyOption,

    #[error("duplicate option in question: {0}")]
    DuplicateOption(String),

    #[error("correct option {0:?} is not one of the question's options")]
    CorrectNotAnOption(String),

    #[error("question {index}: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: Box<QuizError>,
    },
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty label shown on the quiz overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Other(String),
}

impl Difficulty {
    /// Label used when a quiz declares no difficulty.
    pub const UNSPECIFIED_LABEL: &'static str = "Intermediate";

    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Other(label.trim().to_owned()),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Other(label) => label,
        }
    }

    /// Fill level (0-100) for a difficulty meter.
    ///
    /// Only `Easy` and `Medium` sit below the top of the scale.
    #[must_use]
    pub fn level(difficulty: Option<&Self>) -> u8 {
        match difficulty {
            Some(Self::Easy) => 33,
            Some(Self::Medium) => 66,
            _ => 100,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question.
///
/// Options are unique within the question and the correct option is always
/// one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct: String,
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the prompt is blank, there are no options, an
    /// option is blank or repeated, or `correct` is not one of the options.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: impl Into<String>,
    ) -> Result<Self, QuizError> {
        let prompt = prompt.into();
        let correct = correct.into();
        if prompt.trim().is_empty() {
            return Err(QuizError::EmptyPrompt);
        }
        if options.is_empty() {
            return Err(QuizError::NoOptions);
        }

        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if option.trim().is_empty() {
                return Err(QuizError::EmptyOption);
            }
            if !seen.insert(option.as_str()) {
                return Err(QuizError::DuplicateOption(option.clone()));
            }
        }
        if !seen.contains(correct.as_str()) {
            return Err(QuizError::CorrectNotAnOption(correct));
        }

        Ok(Self {
            prompt: prompt.trim().to_owned(),
            options,
            correct,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct(&self) -> &str {
        &self.correct
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    #[must_use]
    pub fn is_correct(&self, answer: Option<&str>) -> bool {
        answer == Some(self.correct.as_str())
    }
}

/// Letter label for an option position: 0 → `A`, 1 → `B`, ...
///
/// Positions past `Z` fall back to the 1-based number.
#[must_use]
pub fn option_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// An immutable quiz loaded from the static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "QuizDraft")]
pub struct Quiz {
    id: QuizId,
    title: String,
    description: String,
    questions: Vec<Question>,
    difficulty: Option<Difficulty>,
    estimated_time: Option<String>,
}

impl Quiz {
    /// Label used when a quiz declares no estimated duration.
    pub const DEFAULT_ESTIMATED_TIME: &'static str = "10 mins";

    /// Creates a new Quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyTitle` for a blank title and
    /// `QuizError::NoQuestions` when `questions` is empty.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        description: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, QuizError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            description: description.into().trim().to_owned(),
            questions,
            difficulty: None,
            estimated_time: None,
        })
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    #[must_use]
    pub fn with_estimated_time(mut self, estimated_time: impl Into<String>) -> Self {
        let estimated_time = estimated_time.into();
        self.estimated_time = Some(estimated_time.trim().to_owned()).filter(|t| !t.is_empty());
        self
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<&Difficulty> {
        self.difficulty.as_ref()
    }

    #[must_use]
    pub fn difficulty_label(&self) -> &str {
        self.difficulty
            .as_ref()
            .map_or(Difficulty::UNSPECIFIED_LABEL, Difficulty::label)
    }

    #[must_use]
    pub fn estimated_time(&self) -> &str {
        self.estimated_time
            .as_deref()
            .unwrap_or(Self::DEFAULT_ESTIMATED_TIME)
    }
}

//
// ─── WIRE SHAPE ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct QuestionDraft {
    text: String,
    options: Vec<String>,
    correct: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizDraft {
    id: QuizId,
    title: String,
    #[serde(default)]
    description: String,
    questions: Vec<QuestionDraft>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    estimated_time: Option<String>,
}

impl TryFrom<QuizDraft> for Quiz {
    type Error = QuizError;

    fn try_from(draft: QuizDraft) -> Result<Self, Self::Error> {
        let questions = draft
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, q)| {
                Question::new(q.text, q.options, q.correct).map_err(|e| {
                    QuizError::InvalidQuestion {
                        index,
                        source: Box::new(e),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut quiz = Quiz::new(draft.id, draft.title, draft.description, questions)?;
        if let Some(label) = draft.difficulty.filter(|d| !d.trim().is_empty()) {
            quiz = quiz.with_difficulty(Difficulty::parse(&label));
        }
        if let Some(estimated) = draft.estimated_time {
            quiz = quiz.with_estimated_time(estimated);
        }
        Ok(quiz)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
