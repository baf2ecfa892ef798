use std::sync::Arc;

use quiz_core::QuizCatalog;
use quiz_core::QuizSummary;
use quiz_core::model::{QuestionReview, QuizId, ScoreRecord, ScoreResult, count_correct, review};
use storage::repository::ScoreRepository;
use tracing::{debug, info, warn};

use super::config::SessionConfig;
use super::session::{QuizSession, SessionStart, SubmitMode};
use super::timer::ActiveAttempt;
use super::view::ScoreHistoryItem;
use crate::Clock;
use crate::error::SessionError;

/// Drives quiz attempts against the catalog and the score store.
///
/// Owns the time source and repository access; never renders anything.
#[derive(Clone)]
pub struct QuizSessionController {
    clock: Clock,
    catalog: Arc<QuizCatalog>,
    scores: Arc<dyn ScoreRepository>,
    config: SessionConfig,
}

impl QuizSessionController {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<QuizCatalog>, scores: Arc<dyn ScoreRepository>) -> Self {
        Self {
            clock,
            catalog,
            scores,
            config: SessionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &QuizCatalog {
        &self.catalog
    }

    /// Overview entries for every quiz, in catalog order.
    #[must_use]
    pub fn list_quizzes(&self) -> Vec<QuizSummary> {
        self.catalog.summaries()
    }

    /// Look up a quiz and prepare an attempt.
    ///
    /// Any stored record is surfaced through `SessionStart::previous`; the
    /// attempt only starts once the caller invokes `SessionStart::begin`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QuizNotFound` for unknown ids and
    /// `SessionError::Storage` if the previous record cannot be read.
    pub async fn start(&self, quiz_id: &QuizId) -> Result<SessionStart, SessionError> {
        let quiz = self
            .catalog
            .get(quiz_id)
            .ok_or_else(|| SessionError::QuizNotFound(quiz_id.clone()))?;
        let previous = self.scores.get_score(quiz_id).await?;

        debug!(
            quiz_id = %quiz_id,
            has_previous = previous.is_some(),
            "prepared quiz session"
        );

        let session = QuizSession::new(quiz, self.config.time_limit_secs(), self.clock.now());
        Ok(SessionStart::new(previous, session))
    }

    /// Begin the attempt and attach its countdown timer.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn begin_attempt(&self, start: SessionStart) -> ActiveAttempt {
        let session = start.begin();
        info!(
            quiz_id = %session.quiz_id(),
            questions = session.question_count(),
            time_limit_secs = session.remaining_secs(),
            "quiz attempt started"
        );
        ActiveAttempt::spawn(session, self.config.tick_period())
    }

    /// Score the session, persist the new record and compare with the previous one.
    ///
    /// The session is marked submitted only after the record is stored, so a
    /// failed write can be retried.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` for a second submission,
    /// `SessionError::IncompleteAnswers` for a manual submission with unanswered
    /// questions, `SessionError::TimeExpired` for a manual submission after the
    /// time limit, and `SessionError::Storage` on repository failures.
    pub async fn submit(
        &self,
        session: &mut QuizSession,
        mode: SubmitMode,
    ) -> Result<ScoreResult, SessionError> {
        session.ensure_submittable(mode)?;

        let quiz_id = session.quiz_id().clone();
        let total = u32::try_from(session.question_count()).unwrap_or(u32::MAX);
        let score = count_correct(session.quiz(), session.answers());

        let previous = self.scores.get_score(&quiz_id).await?;
        let record = ScoreRecord::for_attempt(score, total, self.clock.now(), previous.as_ref())?;
        self.scores.put_score(&quiz_id, &record).await?;
        session.mark_submitted();

        if mode == SubmitMode::Timeout {
            warn!(
                quiz_id = %quiz_id,
                unanswered = session.unanswered_count(),
                "time ran out; submitted with current answers"
            );
        }
        info!(
            quiz_id = %quiz_id,
            score,
            total,
            previous_score = ?previous.as_ref().map(ScoreRecord::score),
            "quiz submitted"
        );

        Ok(ScoreResult::new(record, previous.as_ref()))
    }

    /// Per-question outcomes for the session's answers.
    #[must_use]
    pub fn review(&self, session: &QuizSession) -> Vec<QuestionReview> {
        review(session.quiz(), session.answers())
    }

    /// Latest stored attempt per quiz, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn history(&self) -> Result<Vec<ScoreHistoryItem>, SessionError> {
        let stored = self.scores.list_scores().await?;
        Ok(stored
            .iter()
            .map(|item| {
                let title = self.catalog.get(&item.quiz_id).map(|q| q.title().to_owned());
                ScoreHistoryItem::from_stored(item, title)
            })
            .collect())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, Quiz};
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryRepository;

    fn abc_quiz() -> Quiz {
        let q = |prompt: &str, correct: &str| {
            Question::new(
                prompt,
                vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct,
            )
            .unwrap()
        };
        Quiz::new(
            QuizId::new("abc").unwrap(),
            "ABC",
            "three letters",
            vec![q("one", "A"), q("two", "B"), q("three", "C")],
        )
        .unwrap()
    }

    fn controller(repo: &InMemoryRepository) -> QuizSessionController {
        let catalog = QuizCatalog::new([abc_quiz()]).unwrap();
        QuizSessionController::new(fixed_clock(), Arc::new(catalog), Arc::new(repo.clone()))
    }

    fn id() -> QuizId {
        QuizId::new("abc").unwrap()
    }

    async fn attempt(
        ctl: &QuizSessionController,
        answers: &[&str],
    ) -> Result<ScoreResult, SessionError> {
        let mut session = ctl.start(&id()).await?.begin();
        for answer in answers {
            session.record_answer(answer)?;
        }
        ctl.submit(&mut session, SubmitMode::Manual).await
    }

    #[tokio::test]
    async fn start_unknown_quiz_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = controller(&repo)
            .start(&QuizId::new("nope").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::QuizNotFound(id) if id.as_str() == "nope"));
    }

    #[tokio::test]
    async fn two_of_three_scores_sixty_seven_percent() {
        let repo = InMemoryRepository::new();
        let result = attempt(&controller(&repo), &["A", "B", "D"]).await.unwrap();

        assert_eq!(result.score, 2);
        assert_eq!(result.total, 3);
        assert!((result.percentage - 66.7).abs() < 0.05);
        assert!(result.comparison.is_none());

        let stored = repo.get_score(&id()).await.unwrap().unwrap();
        assert_eq!(stored.score(), 2);
        assert_eq!(stored.previous_score(), None);
        assert_eq!(stored.recorded_at(), fixed_now());
    }

    #[tokio::test]
    async fn second_attempt_compares_with_first() {
        let repo = InMemoryRepository::new();
        let ctl = controller(&repo);
        attempt(&ctl, &["A", "B", "D"]).await.unwrap();

        let start = ctl.start(&id()).await.unwrap();
        assert_eq!(start.previous().map(ScoreRecord::score), Some(2));

        let mut session = start.begin();
        for answer in ["A", "B", "C"] {
            session.record_answer(answer).unwrap();
        }
        let result = ctl.submit(&mut session, SubmitMode::Manual).await.unwrap();

        let cmp = result.comparison.expect("comparison");
        assert_eq!(cmp.score_delta, 1);
        assert!((cmp.percentage_delta - 33.3).abs() < 0.05);
        assert!(cmp.improved);
        assert_eq!(result.record.previous_score(), Some(2));
    }

    #[tokio::test]
    async fn equal_score_is_not_improved() {
        let repo = InMemoryRepository::new();
        let ctl = controller(&repo);
        attempt(&ctl, &["A", "B", "D"]).await.unwrap();
        let result = attempt(&ctl, &["A", "D", "C"]).await.unwrap();

        let cmp = result.comparison.unwrap();
        assert_eq!(cmp.score_delta, 0);
        assert!(!cmp.improved);
    }

    #[tokio::test]
    async fn manual_submit_with_gaps_is_rejected_and_session_stays_open() {
        let repo = InMemoryRepository::new();
        let ctl = controller(&repo);
        let mut session = ctl.start(&id()).await.unwrap().begin();
        session.record_answer("A").unwrap();

        let err = ctl
            .submit(&mut session, SubmitMode::Manual)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::IncompleteAnswers { unanswered: 2 }));
        assert!(!session.is_submitted());
        assert!(repo.get_score(&id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn timeout_submit_scores_unset_as_wrong() {
        let repo = InMemoryRepository::new();
        let ctl = controller(&repo);
        let mut session = ctl.start(&id()).await.unwrap().begin();
        session.record_answer("A").unwrap();

        let result = ctl
            .submit(&mut session, SubmitMode::Timeout)
            .await
            .unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.total, 3);
        assert!(session.is_submitted());
    }

    #[tokio::test]
    async fn resubmission_is_rejected() {
        let repo = InMemoryRepository::new();
        let ctl = controller(&repo);
        let mut session = ctl.start(&id()).await.unwrap().begin();
        for answer in ["A", "B", "C"] {
            session.record_answer(answer).unwrap();
        }
        ctl.submit(&mut session, SubmitMode::Manual).await.unwrap();

        let err = ctl
            .submit(&mut session, SubmitMode::Manual)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::AlreadySubmitted));
        assert!(matches!(
            session.record_answer("A"),
            Err(SessionError::AlreadySubmitted)
        ));
    }

    #[tokio::test]
    async fn review_follows_session_answers() {
        let repo = InMemoryRepository::new();
        let ctl = controller(&repo);
        let mut session = ctl.start(&id()).await.unwrap().begin();
        session.record_answer("A").unwrap();

        let reviews = ctl.review(&session);
        assert_eq!(reviews.len(), 3);
        assert!(reviews[0].is_correct());
        assert!(!reviews[1].is_answered());
    }

    #[tokio::test]
    async fn history_joins_catalog_titles() {
        let repo = InMemoryRepository::new();
        let ctl = controller(&repo);
        attempt(&ctl, &["A", "B", "C"]).await.unwrap();

        let orphan = QuizId::new("retired").unwrap();
        let record = ScoreRecord::for_attempt(1, 1, fixed_now(), None).unwrap();
        repo.put_score(&orphan, &record).await.unwrap();

        let history = ctl.history().await.unwrap();
        assert_eq!(history.len(), 2);
        let abc = history.iter().find(|h| h.quiz_id == id()).unwrap();
        assert_eq!(abc.title.as_deref(), Some("ABC"));
        assert_eq!(abc.score, 3);
        let retired = history.iter().find(|h| h.quiz_id == orphan).unwrap();
        assert!(retired.title.is_none());
    }
}
