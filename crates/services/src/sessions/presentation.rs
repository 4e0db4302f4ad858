use revise_core::model::AnswerOption;

use super::state::{Phase, PhaseKind, SessionState};

/// Read-only view of what the UI should show after a submission.
///
/// Borrowed from the controller, so it cannot drift from the engine state.
#[derive(Debug, Clone, Copy)]
pub struct ResultPresentation<'a> {
    state: &'a SessionState,
}

/// The graded result awaiting acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback<'a> {
    pub correct: bool,
    /// The correct option and its text, only for a wrong answer.
    pub canonical_answer: Option<(AnswerOption, &'a str)>,
    /// Acknowledging this result ends the session.
    pub finishes_session: bool,
}

impl<'a> ResultPresentation<'a> {
    pub(crate) fn new(state: &'a SessionState) -> Self {
        Self { state }
    }

    /// A result is on screen and must be acknowledged before moving on.
    #[must_use]
    pub fn is_result_pending(&self) -> bool {
        self.state.kind() == PhaseKind::ShowingResult
    }

    /// False while the engine waits on the network.
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        !matches!(self.state.kind(), PhaseKind::Loading | PhaseKind::Submitting)
    }

    #[must_use]
    pub fn feedback(&self) -> Option<Feedback<'a>> {
        let Phase::ShowingResult { cursor, result, .. } = self.state.phase() else {
            return None;
        };
        let item = self.state.items().get(cursor.index)?;
        Some(Feedback {
            correct: result.is_correct(),
            canonical_answer: result
                .canonical_answer()
                .map(|option| (option, item.option_text(option))),
            finishes_session: self.state.is_last_item(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revise_core::model::{GradeOutcome, QuestionId, QuestionItem, SessionRequest};
    use revise_core::time::fixed_now;

    use crate::sessions::transition::{SessionEvent, transition};

    fn showing(n: u64, result: GradeOutcome) -> SessionState {
        let items = (1..=n)
            .map(|id| {
                QuestionItem::new(
                    QuestionId::new(id),
                    "Verbs",
                    "Pick one",
                    ["run", "ran", "runned", "running"].map(String::from),
                )
                .unwrap()
            })
            .collect();
        let mut state = SessionState::loading(SessionRequest::review_missed(None));
        for event in [
            SessionEvent::Loaded {
                items,
                at: fixed_now(),
            },
            SessionEvent::Select(AnswerOption::THIRD),
            SessionEvent::Submit { at: fixed_now() },
            SessionEvent::Graded(result),
        ] {
            state = transition(state, event);
        }
        state
    }

    #[test]
    fn wrong_answer_reveals_canonical_text() {
        let state = showing(2, GradeOutcome::incorrect(AnswerOption::SECOND));
        let presentation = ResultPresentation::new(&state);
        assert!(presentation.is_result_pending());
        assert!(presentation.accepts_input());

        let feedback = presentation.feedback().unwrap();
        assert!(!feedback.correct);
        assert_eq!(feedback.canonical_answer, Some((AnswerOption::SECOND, "ran")));
        assert!(!feedback.finishes_session);
    }

    #[test]
    fn last_question_feedback_finishes_session() {
        let state = showing(1, GradeOutcome::correct());
        let feedback = ResultPresentation::new(&state).feedback().unwrap();
        assert!(feedback.correct);
        assert_eq!(feedback.canonical_answer, None);
        assert!(feedback.finishes_session);
    }

    #[test]
    fn nothing_pending_while_loading() {
        let state = SessionState::loading(SessionRequest::review_missed(None));
        let presentation = ResultPresentation::new(&state);
        assert!(!presentation.is_result_pending());
        assert!(!presentation.accepts_input());
        assert!(presentation.feedback().is_none());
    }
}
