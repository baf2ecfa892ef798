use crate::model::quiz::{Quiz, option_label};

//
// ─── OPTION OUTCOME ───────────────────────────────────────────────────────────
//

/// How a single option should be highlighted in the post-quiz review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionOutcome {
    /// The user picked the correct option.
    CorrectChosen,
    /// The user picked this option and it is wrong.
    IncorrectChosen,
    /// The correct option, which the user did not pick.
    CorrectUnchosen,
    /// Any other option the user did not pick.
    OtherUnchosen,
}

impl OptionOutcome {
    #[must_use]
    pub fn classify(option: &str, chosen: Option<&str>, correct: &str) -> Self {
        let is_chosen = chosen == Some(option);
        let is_correct = option == correct;
        match (is_chosen, is_correct) {
            (true, true) => Self::CorrectChosen,
            (true, false) => Self::IncorrectChosen,
            (false, true) => Self::CorrectUnchosen,
            (false, false) => Self::OtherUnchosen,
        }
    }
}

//
// ─── QUESTION REVIEW ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionReview {
    pub label: String,
    pub text: String,
    pub outcome: OptionOutcome,
}

/// Per-question outcome after a quiz has been submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    /// 1-based question number.
    pub number: usize,
    pub prompt: String,
    pub chosen: Option<String>,
    pub correct: String,
    pub options: Vec<OptionReview>,
}

impl QuestionReview {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.chosen.as_deref() == Some(self.correct.as_str())
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.chosen.is_some()
    }
}

/// Classifies every option of every question against the given answers.
///
/// Pure; `answers` shorter than the question list treats missing slots as unset.
#[must_use]
pub fn review(quiz: &Quiz, answers: &[Option<String>]) -> Vec<QuestionReview> {
    quiz.questions()
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let chosen = answers.get(i).cloned().flatten();
            let options = question
                .options()
                .iter()
                .enumerate()
                .map(|(j, option)| OptionReview {
                    label: option_label(j),
                    text: option.clone(),
                    outcome: OptionOutcome::classify(
                        option,
                        chosen.as_deref(),
                        question.correct(),
                    ),
                })
                .collect();

            QuestionReview {
                number: i + 1,
                prompt: question.prompt().to_owned(),
                chosen,
                correct: question.correct().to_owned(),
                options,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, QuizId};

    fn quiz() -> Quiz {
        let q = |prompt: &str, correct: &str| {
            Question::new(
                prompt,
                vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct,
            )
            .unwrap()
        };
        Quiz::new(
            QuizId::new("letters").unwrap(),
            "Letters",
            "",
            vec![q("one", "A"), q("two", "B"), q("three", "C")],
        )
        .unwrap()
    }

    #[test]
    fn unanswered_question_marks_correct_and_others() {
        let reviews = review(&quiz(), &[Some("A".into()), None, Some("D".into())]);
        let second = &reviews[1];

        assert!(!second.is_answered());
        assert!(!second.is_correct());
        let outcomes: Vec<_> = second.options.iter().map(|o| o.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                OptionOutcome::OtherUnchosen,
                OptionOutcome::CorrectUnchosen,
                OptionOutcome::OtherUnchosen,
                OptionOutcome::OtherUnchosen,
            ]
        );
    }

    #[test]
    fn chosen_options_are_classified() {
        let reviews = review(&quiz(), &[Some("A".into()), None, Some("D".into())]);

        assert!(reviews[0].is_correct());
        assert_eq!(reviews[0].options[0].outcome, OptionOutcome::CorrectChosen);
        assert_eq!(reviews[0].options[0].label, "A");

        let third = &reviews[2];
        assert_eq!(third.number, 3);
        assert_eq!(third.options[2].outcome, OptionOutcome::CorrectUnchosen);
        assert_eq!(third.options[3].outcome, OptionOutcome::IncorrectChosen);
    }

    #[test]
    fn short_answer_list_counts_as_unset() {
        let reviews = review(&quiz(), &[]);
        assert_eq!(reviews.len(), 3);
        assert!(reviews.iter().all(|r| r.chosen.is_none()));
    }
}
