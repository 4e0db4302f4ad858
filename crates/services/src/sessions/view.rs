use revise_core::model::{AnswerOption, QuestionItem, SessionMode};
use revise_core::{MasteryLevel, SessionStats};

use super::state::{PhaseKind, SessionState};

/// Presentation-agnostic snapshot of a session for rendering.
///
/// Carries numbers and domain values only; the UI decides how to format them.
#[derive(Debug, Clone, Copy)]
pub struct SessionSnapshot<'a> {
    state: &'a SessionState,
}

/// Why a session ended with nothing to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NothingToReview,
    NoQuestionsInChapter,
}

impl EmptyReason {
    #[must_use]
    pub fn for_mode(mode: SessionMode) -> Self {
        match mode {
            SessionMode::ReviewMissed => Self::NothingToReview,
            SessionMode::ChapterPractice => Self::NoQuestionsInChapter,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::NothingToReview => {
                "You have no questions to review right now. Keep answering QCMs to identify your weak spots."
            }
            Self::NoQuestionsInChapter => "No questions are available for this chapter.",
        }
    }
}

/// End-of-session figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSummary {
    pub stats: SessionStats,
    pub percentage: u8,
    pub mastery: MasteryLevel,
    pub time_spent_seconds: u64,
}

impl<'a> SessionSnapshot<'a> {
    pub(crate) fn new(state: &'a SessionState) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn phase(&self) -> PhaseKind {
        self.state.kind()
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.state.request().mode()
    }

    #[must_use]
    pub fn chapter(&self) -> Option<&'a str> {
        self.state.request().chapter()
    }

    /// 1-based position for "Question n / total" counters.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        self.state
            .current_item()
            .map(|_| (self.state.current_index() + 1, self.state.total_items()))
    }

    #[must_use]
    pub fn question(&self) -> Option<&'a QuestionItem> {
        self.state.current_item()
    }

    /// Chapter label of the current question, or the requested chapter.
    #[must_use]
    pub fn question_chapter(&self) -> Option<&'a str> {
        self.question()
            .map(QuestionItem::chapter)
            .filter(|chapter| !chapter.is_empty())
            .or_else(|| self.chapter())
    }

    #[must_use]
    pub fn selected(&self) -> Option<AnswerOption> {
        self.state.selected_option()
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.state.stats()
    }

    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        self.state.progress_percent()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase() == PhaseKind::Active && self.selected().is_some()
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        self.phase() == PhaseKind::Active && self.state.current_index() > 0
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.state.pending_submission()
    }

    #[must_use]
    pub fn empty_reason(&self) -> Option<EmptyReason> {
        (self.phase() == PhaseKind::Empty).then(|| EmptyReason::for_mode(self.mode()))
    }

    #[must_use]
    pub fn completion(&self) -> Option<CompletionSummary> {
        if self.phase() != PhaseKind::Completed {
            return None;
        }
        let stats = self.stats();
        Some(CompletionSummary {
            stats,
            percentage: stats.percentage(),
            mastery: stats.mastery(),
            time_spent_seconds: self.state.time_spent_seconds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revise_core::model::{GradeOutcome, QuestionId, SessionRequest};
    use revise_core::time::fixed_now;

    use crate::sessions::transition::{SessionEvent, transition};

    fn item(id: u64, chapter: &str) -> QuestionItem {
        QuestionItem::new(
            QuestionId::new(id),
            chapter,
            "Prompt",
            ["a", "b", "c", "d"].map(String::from),
        )
        .unwrap()
    }

    fn load(request: SessionRequest, items: Vec<QuestionItem>) -> SessionState {
        transition(
            SessionState::loading(request),
            SessionEvent::Loaded {
                items,
                at: fixed_now(),
            },
        )
    }

    #[test]
    fn scenario_c_empty_review_explains_itself() {
        let state = load(SessionRequest::from_params(Some("revision"), None).unwrap(), vec![]);
        let snapshot = SessionSnapshot::new(&state);
        assert_eq!(snapshot.empty_reason(), Some(EmptyReason::NothingToReview));
        assert!(
            snapshot
                .empty_reason()
                .unwrap()
                .message()
                .contains("no questions to review")
        );
        assert!(snapshot.question().is_none());
    }

    #[test]
    fn empty_chapter_has_its_own_message() {
        let state = load(SessionRequest::chapter_practice("Verbs").unwrap(), vec![]);
        assert_eq!(
            SessionSnapshot::new(&state).empty_reason(),
            Some(EmptyReason::NoQuestionsInChapter)
        );
    }

    #[test]
    fn active_snapshot_reports_position_and_controls() {
        let state = load(
            SessionRequest::review_missed(None),
            vec![item(1, ""), item(2, "Verbs")],
        );
        let snapshot = SessionSnapshot::new(&state);
        assert_eq!(snapshot.position(), Some((1, 2)));
        assert_eq!(snapshot.progress_percent(), 0);
        assert!(!snapshot.can_submit());
        assert!(!snapshot.can_go_previous());
        assert_eq!(snapshot.question_chapter(), None);

        let state = transition(state, SessionEvent::Select(AnswerOption::FIRST));
        assert!(SessionSnapshot::new(&state).can_submit());
    }

    #[test]
    fn completion_summary_after_last_answer() {
        let mut state = load(SessionRequest::chapter_practice("Verbs").unwrap(), vec![item(1, "Verbs")]);
        for event in [
            SessionEvent::Select(AnswerOption::SECOND),
            SessionEvent::Submit {
                at: fixed_now() + chrono::Duration::seconds(75),
            },
            SessionEvent::Graded(GradeOutcome::correct()),
            SessionEvent::Acknowledge { at: fixed_now() },
        ] {
            state = transition(state, event);
        }
        let snapshot = SessionSnapshot::new(&state);
        let summary = snapshot.completion().unwrap();
        assert_eq!(summary.percentage, 100);
        assert_eq!(summary.mastery, MasteryLevel::Expert);
        assert_eq!(summary.time_spent_seconds, 75);
        assert_eq!(snapshot.progress_percent(), 100);
        assert!(snapshot.position().is_none());
    }
}
