use std::time::Duration;

use quiz_core::model::ScoreResult;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use super::controller::QuizSessionController;
use super::session::{QuizSession, SubmitMode, TickOutcome};
use crate::error::SessionError;

//
// ─── TIMER ─────────────────────────────────────────────────────────────────────
//

/// Recurring countdown task delivering one tick per period.
///
/// The background task stops on `cancel` and is aborted when the timer is
/// dropped, so an abandoned attempt leaves nothing running.
pub struct SessionTimer {
    handle: Option<JoinHandle<()>>,
    ticks: mpsc::Receiver<()>,
}

impl SessionTimer {
    /// Spawn the tick task on the current tokio runtime.
    ///
    /// The first tick arrives one full `period` after spawning.
    #[must_use]
    pub fn spawn(period: Duration) -> Self {
        let (tx, ticks) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self {
            handle: Some(handle),
            ticks,
        }
    }

    /// Wait for the next tick. Returns `None` once the timer is cancelled.
    pub async fn next_tick(&mut self) -> Option<()> {
        if self.handle.is_none() {
            return None;
        }
        self.ticks.recv().await
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.ticks.close();
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

//
// ─── ACTIVE ATTEMPT ────────────────────────────────────────────────────────────
//

/// What a timer tick did to the attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptEvent {
    Running { remaining: u32 },
    /// Time ran out and the attempt was submitted with the answers so far.
    TimedOut(ScoreResult),
    Idle,
}

/// An in-progress session bundled with the timer that drives its countdown.
///
/// Submitting (manually or by timeout) cancels the timer; dropping the attempt
/// abandons it.
pub struct ActiveAttempt {
    session: QuizSession,
    timer: SessionTimer,
}

impl ActiveAttempt {
    pub(crate) fn spawn(session: QuizSession, tick_period: Duration) -> Self {
        Self {
            session,
            timer: SessionTimer::spawn(tick_period),
        }
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Mutable access for answering and navigation.
    pub fn session_mut(&mut self) -> &mut QuizSession {
        &mut self.session
    }

    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Wait for the next countdown tick; `None` once the timer has stopped.
    pub async fn next_tick(&mut self) -> Option<()> {
        self.timer.next_tick().await
    }

    /// Apply one tick; on expiry submit with `SubmitMode::Timeout`.
    ///
    /// The timer stops only once the timeout submission is stored. After a
    /// failed write it keeps ticking and the next tick retries the submission.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from the timeout submission.
    pub async fn on_tick(
        &mut self,
        controller: &QuizSessionController,
    ) -> Result<AttemptEvent, SessionError> {
        match self.session.tick() {
            TickOutcome::Running { remaining } => Ok(AttemptEvent::Running { remaining }),
            TickOutcome::Idle => {
                self.timer.cancel();
                Ok(AttemptEvent::Idle)
            }
            TickOutcome::Expired => {
                let result = controller
                    .submit(&mut self.session, SubmitMode::Timeout)
                    .await?;
                self.timer.cancel();
                Ok(AttemptEvent::TimedOut(result))
            }
        }
    }

    /// Manual submission; the timer keeps running if the submission is rejected.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::IncompleteAnswers` while questions are unanswered,
    /// `SessionError::TimeExpired` once time is up (the timeout submission is
    /// retried by `on_tick`), plus any error from `QuizSessionController::submit`.
    pub async fn submit(
        &mut self,
        controller: &QuizSessionController,
    ) -> Result<ScoreResult, SessionError> {
        let result = controller
            .submit(&mut self.session, SubmitMode::Manual)
            .await?;
        self.timer.cancel();
        Ok(result)
    }

    /// Stop the timer and hand back the session, e.g. for the review screen.
    #[must_use]
    pub fn into_session(mut self) -> QuizSession {
        self.timer.cancel();
        self.session
    }

    /// Leave the attempt without submitting.
    pub fn abandon(self) {
        debug!(quiz_id = %self.session.quiz_id(), "quiz attempt abandoned");
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
