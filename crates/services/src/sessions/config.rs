use std::time::Duration;

/// Time limits for a quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    time_limit_secs: u32,
    tick_period: Duration,
}

impl SessionConfig {
    /// Ten minutes per attempt.
    pub const DEFAULT_TIME_LIMIT_SECS: u32 = 600;

    #[must_use]
    pub fn new() -> Self {
        Self {
            time_limit_secs: Self::DEFAULT_TIME_LIMIT_SECS,
            tick_period: Duration::from_secs(1),
        }
    }

    /// A zero limit is raised to one second so a session can always tick.
    #[must_use]
    pub fn with_time_limit_secs(mut self, secs: u32) -> Self {
        self.time_limit_secs = secs.max(1);
        self
    }

    /// Wall-clock period of one countdown tick; zero falls back to one second.
    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = if period.is_zero() {
            Duration::from_secs(1)
        } else {
            period
        };
        self
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
