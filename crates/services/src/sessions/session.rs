use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use quiz_core::model::{Question, Quiz, QuizId, ScoreRecord};
use quiz_core::time::format_countdown;

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a quiz attempt: `NotStarted → InProgress → Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NotStarted,
    InProgress,
    Submitted,
}

/// Outcome of advancing the countdown by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time is still left.
    Running { remaining: u32 },
    /// Time ran out; the caller must submit with `SubmitMode::Timeout`.
    Expired,
    /// The session is not in progress; nothing was counted.
    Idle,
}

/// How a submission was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// User action; every question must be answered.
    Manual,
    /// Countdown expiry; unanswered questions score as wrong.
    Timeout,
}

//
// ─── SESSION START ─────────────────────────────────────────────────────────────
//

/// Decision point returned by `start`.
///
/// When `previous` is set the host shows the earlier result and lets the user
/// either `begin` a new attempt or drop this value to go back to the list.
#[derive(Debug)]
pub struct SessionStart {
    previous: Option<ScoreRecord>,
    session: QuizSession,
}

impl SessionStart {
    pub(crate) fn new(previous: Option<ScoreRecord>, session: QuizSession) -> Self {
        Self { previous, session }
    }

    #[must_use]
    pub fn previous(&self) -> Option<&ScoreRecord> {
        self.previous.as_ref()
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        self.session.quiz()
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.session.remaining_secs()
    }

    /// Start the attempt: index 0, all answers unset, full time budget.
    #[must_use]
    pub fn begin(self) -> QuizSession {
        let mut session = self.session;
        session.phase = SessionPhase::InProgress;
        session
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Mutable state of one quiz attempt.
///
/// Holds exactly one answer slot per question; a set slot always equals one of
/// that question's options.
pub struct QuizSession {
    quiz: Arc<Quiz>,
    current: usize,
    answers: Vec<Option<String>>,
    remaining_secs: u32,
    phase: SessionPhase,
    created_at: DateTime<Utc>,
}

impl QuizSession {
    pub(crate) fn new(quiz: Arc<Quiz>, time_limit_secs: u32, created_at: DateTime<Utc>) -> Self {
        let answers = vec![None; quiz.question_count()];
        Self {
            quiz,
            current: 0,
            answers,
            remaining_secs: time_limit_secs,
            phase: SessionPhase::NotStarted,
            created_at,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        self.quiz.id()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.phase != SessionPhase::NotStarted
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.phase == SessionPhase::Submitted
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.quiz.questions()[self.current]
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<&str> {
        self.answers[self.current].as_deref()
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 == self.answers.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.answers.len() - self.answered_count()
    }

    /// True when a manual submission would be accepted.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase == SessionPhase::InProgress
            && self.remaining_secs > 0
            && self.unanswered_count() == 0
    }

    /// In progress with no time left: answers are frozen until the timeout submission lands.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.phase == SessionPhase::InProgress && self.remaining_secs == 0
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.question_count();
        #[allow(clippy::cast_precision_loss)]
        let percent = if total == 0 {
            0.0
        } else {
            self.current as f64 / total as f64 * 100.0
        };
        SessionProgress {
            question_number: self.current + 1,
            total,
            answered: self.answered_count(),
            unanswered: self.unanswered_count(),
            percent,
            remaining_secs: self.remaining_secs,
            remaining_display: format_countdown(self.remaining_secs),
            can_submit: self.can_submit(),
        }
    }

    /// Record `option` for the current question and advance unless on the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` once the session is submitted,
    /// `SessionError::TimeExpired` after the time limit and
    /// `SessionError::UnknownOption` when `option` is not offered by the current
    /// question; the session is left unchanged in each case.
    pub fn record_answer(&mut self, option: &str) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Submitted {
            return Err(SessionError::AlreadySubmitted);
        }
        if self.is_expired() {
            return Err(SessionError::TimeExpired);
        }
        if !self.current_question().has_option(option) {
            return Err(SessionError::UnknownOption {
                question: self.current + 1,
                option: option.to_owned(),
            });
        }

        self.answers[self.current] = Some(option.to_owned());
        if !self.is_last_question() {
            self.current += 1;
        }
        Ok(())
    }

    /// Move by `delta` questions, clamped to the quiz bounds. Answers are kept.
    ///
    /// Returns the new index.
    pub fn navigate(&mut self, delta: isize) -> usize {
        let last = self.answers.len().saturating_sub(1);
        self.current = self.current.saturating_add_signed(delta).min(last);
        self.current
    }

    pub fn previous(&mut self) -> usize {
        self.navigate(-1)
    }

    pub fn next(&mut self) -> usize {
        self.navigate(1)
    }

    /// Count down one second.
    ///
    /// Reaching zero yields `TickOutcome::Expired`, as does ticking an
    /// in-progress session that already has no time left.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != SessionPhase::InProgress {
            return TickOutcome::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                remaining: self.remaining_secs,
            }
        }
    }

    pub(crate) fn ensure_submittable(&self, mode: SubmitMode) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Submitted {
            return Err(SessionError::AlreadySubmitted);
        }
        if mode == SubmitMode::Manual && self.is_expired() {
            return Err(SessionError::TimeExpired);
        }
        let unanswered = self.unanswered_count();
        if mode == SubmitMode::Manual && unanswered > 0 {
            return Err(SessionError::IncompleteAnswers { unanswered });
        }
        Ok(())
    }

    pub(crate) fn mark_submitted(&mut self) {
        self.phase = SessionPhase::Submitted;
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", self.quiz.id())
            .field("current", &self.current)
            .field("answered", &self.answered_count())
            .field("remaining_secs", &self.remaining_secs)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
