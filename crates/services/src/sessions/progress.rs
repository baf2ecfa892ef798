/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionProgress {
    /// 1-based number of the question on screen.
    pub question_number: usize,
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
    /// Share of questions before the current one, in `[0, 100)`.
    pub percent: f64,
    pub remaining_secs: u32,
    /// Countdown as `m:ss`.
    pub remaining_display: String,
    pub can_submit: bool,
}
