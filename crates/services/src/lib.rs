#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::QuizServices;
pub use error::{AppServicesError, SessionError};

pub use sessions::{
    ActiveAttempt, AttemptEvent, QuizSession, QuizSessionController, ScoreHistoryItem,
    SessionConfig, SessionPhase, SessionProgress, SessionStart, SessionTimer, SubmitMode,
    TickOutcome,
};
