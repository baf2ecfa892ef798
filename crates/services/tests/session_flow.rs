use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use quiz_core::model::{OptionOutcome, QuizId, ScoreRecord};
use quiz_core::time::fixed_now;
use quiz_core::{Clock, QuizCatalog};
use services::{
    QuizServices, QuizSessionController, SessionConfig, SessionError, SubmitMode, TickOutcome,
};
use storage::repository::{
    InMemoryRepository, ScoreRepository, Storage, StorageError, StoredScore,
};

const CATALOG: &str = r#"[
    {
        "id": "planets",
        "title": "Planets",
        "description": "The solar system",
        "difficulty": "Easy",
        "questions": [
            { "text": "Red planet?", "options": ["Mars", "Venus", "Earth"], "correct": "Mars" },
            { "text": "Ringed giant?", "options": ["Mercury", "Saturn"], "correct": "Saturn" },
            { "text": "Closest to the sun?", "options": ["Mercury", "Neptune"], "correct": "Mercury" }
        ]
    }
]"#;

fn planets() -> QuizId {
    QuizId::new("planets").unwrap()
}

fn catalog() -> QuizCatalog {
    QuizCatalog::from_json(CATALOG).unwrap()
}

/// Store whose writes fail until `healthy` is flipped.
#[derive(Default)]
struct FlakyRepository {
    inner: InMemoryRepository,
    healthy: AtomicBool,
}

#[async_trait]
impl ScoreRepository for FlakyRepository {
    async fn get_score(&self, quiz_id: &QuizId) -> Result<Option<ScoreRecord>, StorageError> {
        self.inner.get_score(quiz_id).await
    }

    async fn put_score(&self, quiz_id: &QuizId, record: &ScoreRecord) -> Result<(), StorageError> {
        if !self.healthy.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("disk unavailable".into()));
        }
        self.inner.put_score(quiz_id, record).await
    }

    async fn list_scores(&self) -> Result<Vec<StoredScore>, StorageError> {
        self.inner.list_scores().await
    }
}

#[tokio::test]
async fn full_attempt_then_retry_carries_previous_score() {
    let services = QuizServices::in_memory(Clock::fixed(fixed_now()), catalog(), SessionConfig::new());
    let ctl = services.controller();

    let summaries = ctl.list_quizzes();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].question_count, 3);

    let start = ctl.start(&planets()).await.unwrap();
    assert!(start.previous().is_none());
    let mut session = start.begin();
    assert_eq!(session.answers().len(), 3);
    for answer in ["Mars", "Mercury", "Mercury"] {
        session.record_answer(answer).unwrap();
    }
    let first = ctl.submit(&mut session, SubmitMode::Manual).await.unwrap();
    assert_eq!(first.score, 2);

    let review = ctl.review(&session);
    assert_eq!(review[1].options[0].outcome, OptionOutcome::IncorrectChosen);
    assert_eq!(review[1].options[1].outcome, OptionOutcome::CorrectUnchosen);

    let start = ctl.start(&planets()).await.unwrap();
    let previous = start.previous().expect("previous attempt surfaced");
    assert_eq!(previous.score(), 2);

    let mut session = start.begin();
    for answer in ["Venus", "Saturn", "Neptune"] {
        session.record_answer(answer).unwrap();
    }
    let second = ctl.submit(&mut session, SubmitMode::Manual).await.unwrap();
    let cmp = second.comparison.unwrap();
    assert_eq!(second.score, 1);
    assert_eq!(cmp.score_delta, -1);
    assert!(!cmp.improved);
    assert_eq!(second.record.previous_score(), Some(2));

    let history = ctl.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].title.as_deref(), Some("Planets"));
    assert_eq!(history[0].previous_score, Some(2));
}

#[tokio::test]
async fn failed_write_leaves_session_submittable() {
    let repo = Arc::new(FlakyRepository::default());
    let ctl = QuizSessionController::new(
        Clock::fixed(fixed_now()),
        Arc::new(catalog()),
        Arc::clone(&repo) as Arc<dyn ScoreRepository>,
    );

    let mut session = ctl.start(&planets()).await.unwrap().begin();
    for answer in ["Mars", "Saturn", "Mercury"] {
        session.record_answer(answer).unwrap();
    }

    let err = ctl
        .submit(&mut session, SubmitMode::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Storage(_)));
    assert!(!session.is_submitted());

    repo.healthy.store(true, Ordering::SeqCst);
    let result = ctl.submit(&mut session, SubmitMode::Manual).await.unwrap();
    assert_eq!(result.score, 3);
    assert!((result.percentage - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn expired_attempt_keeps_deadline_answers_across_failed_write() {
    let repo = Arc::new(FlakyRepository::default());
    let ctl = QuizSessionController::new(
        Clock::fixed(fixed_now()),
        Arc::new(catalog()),
        Arc::clone(&repo) as Arc<dyn ScoreRepository>,
    )
    .with_config(SessionConfig::new().with_time_limit_secs(1));

    let mut session = ctl.start(&planets()).await.unwrap().begin();
    session.record_answer("Mars").unwrap();
    assert_eq!(session.tick(), TickOutcome::Expired);

    let err = ctl
        .submit(&mut session, SubmitMode::Timeout)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Storage(_)));
    assert!(session.is_expired());

    assert!(matches!(
        session.record_answer("Saturn"),
        Err(SessionError::TimeExpired)
    ));
    assert!(matches!(
        ctl.submit(&mut session, SubmitMode::Manual).await,
        Err(SessionError::TimeExpired)
    ));

    repo.healthy.store(true, Ordering::SeqCst);
    assert_eq!(session.tick(), TickOutcome::Expired);
    let result = ctl.submit(&mut session, SubmitMode::Timeout).await.unwrap();
    assert_eq!(result.score, 1);
    assert_eq!(repo.get_score(&planets()).await.unwrap().unwrap().score(), 1);
}

#[tokio::test]
async fn sqlite_backed_services_persist_scores() {
    let storage = Storage::sqlite("sqlite:file:memdb_services_flow?mode=memory&cache=shared")
        .await
        .unwrap();
    let services = QuizServices::from_storage(
        &storage,
        Clock::fixed(fixed_now()),
        catalog(),
        SessionConfig::new(),
    );
    let ctl = services.controller();

    let mut session = ctl.start(&planets()).await.unwrap().begin();
    session.record_answer("Earth").unwrap();
    let result = ctl.submit(&mut session, SubmitMode::Timeout).await.unwrap();
    assert_eq!(result.score, 0);

    let stored = storage.scores.get_score(&planets()).await.unwrap().unwrap();
    assert_eq!(stored.score(), 0);
    assert_eq!(stored.total(), 3);
}
