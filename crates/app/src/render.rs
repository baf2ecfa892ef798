//! Plain-text presentation for the terminal host.

use std::fmt::Write as _;

use quiz_core::QuizSummary;
use quiz_core::model::{OptionOutcome, QuestionReview, ScoreRecord, ScoreResult, option_label};
use services::{QuizSession, ScoreHistoryItem};

pub fn quiz_list(summaries: &[QuizSummary]) -> String {
    let mut out = format!("{} quizzes available\n", summaries.len());
    for s in summaries {
        let _ = writeln!(
            out,
            "\n  {id}  {title}\n      {desc}\n      {count} questions · {time} · {difficulty} ({level}%)",
            id = s.id,
            title = s.title,
            desc = s.description,
            count = s.question_count,
            time = s.estimated_time,
            difficulty = s.difficulty,
            level = s.difficulty_level,
        );
    }
    out
}

pub fn previous_attempt(title: &str, previous: &ScoreRecord) -> String {
    format!(
        "You've already completed {title}. Your previous score was {} out of {} ({:.1}% correct).\n\
         [r] start new attempt   [b] back to quizzes",
        previous.score(),
        previous.total(),
        previous.percentage(),
    )
}

pub fn question(session: &QuizSession) -> String {
    let progress = session.progress();
    let question = session.current_question();
    let mut out = format!(
        "\nQuestion {} of {}  [{}]  ({:.0}% through)\n{}\n",
        progress.question_number,
        progress.total,
        progress.remaining_display,
        progress.percent,
        question.prompt(),
    );
    for (i, option) in question.options().iter().enumerate() {
        let marker = if session.current_answer() == Some(option.as_str()) {
            '*'
        } else {
            ' '
        };
        let _ = writeln!(out, " {marker} {}. {option}", option_label(i));
    }
    let submit_hint = if progress.can_submit { "  [s] submit" } else { "" };
    let _ = write!(
        out,
        "answer with a letter · [p] previous  [n] next  [t] time  [q] quit{submit_hint}"
    );
    out
}

pub fn score(result: &ScoreResult) -> String {
    let mut out = format!(
        "\nQuiz complete! You scored {} out of {} ({:.1}% correct)\n",
        result.score, result.total, result.percentage
    );
    if let Some(cmp) = &result.comparison {
        let trend = if cmp.improved { "up" } else { "down" };
        let _ = writeln!(
            out,
            "Compared to previous attempt: {trend} {:+} points ({:+.1}%)\nPrevious score: {} out of {} ({:.1}%)",
            cmp.score_delta,
            cmp.percentage_delta,
            cmp.previous_score,
            result.total,
            cmp.previous_percentage,
        );
    }
    out
}

pub fn review(reviews: &[QuestionReview]) -> String {
    let mut out = String::new();
    for r in reviews {
        let _ = writeln!(out, "\nQuestion {}: {}", r.number, r.prompt);
        for option in &r.options {
            let note = match option.outcome {
                OptionOutcome::CorrectChosen => "  <- your answer (correct)",
                OptionOutcome::IncorrectChosen => "  <- your answer (incorrect)",
                OptionOutcome::CorrectUnchosen => "  <- correct answer",
                OptionOutcome::OtherUnchosen => "",
            };
            let _ = writeln!(out, "   {}. {}{note}", option.label, option.text);
        }
    }
    out
}

pub fn history(items: &[ScoreHistoryItem]) -> String {
    if items.is_empty() {
        return "No quiz attempts yet.".to_owned();
    }
    let mut out = String::new();
    for item in items {
        let title = item.title.as_deref().unwrap_or(item.quiz_id.as_str());
        let previous = item
            .previous_score
            .map_or_else(String::new, |p| format!(" (previous: {p})"));
        let _ = writeln!(
            out,
            "{title}: {} / {} ({:.1}%) on {}{previous}",
            item.score,
            item.total,
            item.percentage,
            item.recorded_at.to_rfc3339(),
        );
    }
    out
}
