mod config;
mod controller;
mod progress;
mod session;
mod timer;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use config::SessionConfig;
pub use controller::QuizSessionController;
pub use progress::SessionProgress;
pub use session::{QuizSession, SessionPhase, SessionStart, SubmitMode, TickOutcome};
pub use timer::{ActiveAttempt, AttemptEvent, SessionTimer};
pub use view::ScoreHistoryItem;
