mod ids;
mod quiz;
mod review;
mod score;

pub use ids::{ParseIdError, QuizId};

pub use quiz::{Difficulty, Question, Quiz, QuizError, option_label};
pub use review::{OptionOutcome, OptionReview, QuestionReview, review};
pub use score::{
    Comparison, ScoreRecord, ScoreRecordError, ScoreResult, count_correct, percentage,
};
