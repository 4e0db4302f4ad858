//! Text rendering of a session for the terminal.

use revise_core::model::{AnswerOption, SessionMode};
use revise_core::stats::format_time_spent;
use services::{CompletionSummary, Feedback, SessionSnapshot};

#[must_use]
pub fn title(mode: SessionMode, chapter: Option<&str>) -> String {
    match (mode, chapter) {
        (SessionMode::ReviewMissed, _) | (SessionMode::ChapterPractice, None) => {
            "Revision mode".to_owned()
        }
        (SessionMode::ChapterPractice, Some(chapter)) => format!("Revision - {chapter}"),
    }
}

#[must_use]
pub fn counter(position: usize, total: usize) -> String {
    format!("Question {position}/{total}")
}

#[must_use]
pub fn score(correct: u32, answered: u32) -> String {
    format!("{correct}/{answered} correct")
}

#[must_use]
pub fn progress_bar(percent: u8, width: usize) -> String {
    let filled = usize::from(percent.min(100)) * width / 100;
    format!("[{}{}] {percent}%", "#".repeat(filled), "-".repeat(width - filled))
}

/// Header and options of the question on screen.
#[must_use]
pub fn question(snapshot: &SessionSnapshot<'_>) -> String {
    let Some(item) = snapshot.question() else {
        return String::new();
    };
    let mut out = title(snapshot.mode(), snapshot.chapter());
    if let Some((position, total)) = snapshot.position() {
        let stats = snapshot.stats();
        out.push_str(&format!(
            "  |  {}  |  {}\n",
            counter(position, total),
            score(stats.correct_count, stats.total_answered)
        ));
    }
    out.push_str(&progress_bar(snapshot.progress_percent(), 20));
    out.push('\n');
    if let Some(chapter) = snapshot.question_chapter() {
        out.push_str(&format!("[{chapter}]\n"));
    }
    out.push_str(item.prompt());
    out.push('\n');
    for (option, text) in item.options() {
        let marker = if snapshot.selected() == Some(option) { '>' } else { ' ' };
        out.push_str(&format!("{marker} {}. {text}\n", option.value()));
    }
    out
}

#[must_use]
pub fn feedback(feedback: &Feedback<'_>) -> String {
    let mut out = if feedback.correct {
        "Correct answer!".to_owned()
    } else {
        "Wrong answer".to_owned()
    };
    if let Some((option, text)) = feedback.canonical_answer {
        out.push_str(&format!("\nThe correct answer was: {}", canonical(option, text)));
    }
    let next = if feedback.finishes_session {
        "Finish"
    } else {
        "Next question"
    };
    out.push_str(&format!("\n[Enter] {next}"));
    out
}

fn canonical(option: AnswerOption, text: &str) -> String {
    format!("{}. {text}", option.value())
}

#[must_use]
pub fn completion(summary: &CompletionSummary) -> String {
    let target = if summary.stats.meets_target() {
        "Target reached"
    } else {
        "Keep practicing"
    };
    format!(
        "Session complete\n{} correct answers out of {} questions\nSuccess rate: {}% ({target})\nLevel: {}\nTime spent: {}",
        summary.stats.correct_count,
        summary.stats.total_answered,
        summary.percentage,
        summary.mastery.label(),
        format_time_spent(summary.time_spent_seconds),
    )
}
