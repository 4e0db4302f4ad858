use std::fmt;

use remote::GradingError;
use revise_core::Clock;
use revise_core::SessionStats;
use revise_core::model::{
    AnswerOption, AnswerSubmission, GradeOutcome, QuestionItem, SessionId, SessionRequest,
};
use tracing::{debug, info};

use super::presentation::ResultPresentation;
use super::state::{Phase, PhaseKind, SessionState};
use super::transition::{SessionEvent, step};
use super::view::SessionSnapshot;

//
// ─── TICKETS ───────────────────────────────────────────────────────────────────
//

/// Permission to run one question load for a given generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    request: SessionRequest,
}

impl LoadTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn request(&self) -> &SessionRequest {
        &self.request
    }
}

/// Permission to resolve the one outstanding submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    generation: u64,
    submission: AnswerSubmission,
}

impl SubmitTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn submission(&self) -> &AnswerSubmission {
        &self.submission
    }
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What happened to a request made to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Applied,
    /// The current phase does not accept this operation; nothing changed.
    Ignored,
    /// The response belongs to an earlier generation and was dropped.
    Stale,
}

/// Resolution of a submission as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Graded(GradeOutcome),
    /// Already answered elsewhere; the session moved on without a result.
    Skipped,
    /// Grading failed; the selection is kept so the student can retry.
    Failed(GradingError),
    /// No submission was opened (no selection, or one already pending).
    Ignored,
    Stale,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Owns one revision session and is the only way to mutate it.
///
/// Asynchronous work is split into open/resolve pairs: `load_ticket` /
/// `finish_load` and `begin_submit` / `finish_submit`. Each ticket carries
/// the generation at which it was issued; the generation moves on every
/// restart, teardown, submission and question change, so a late response can never
/// write into a session that has moved on.
pub struct SessionController {
    id: SessionId,
    clock: Clock,
    state: SessionState,
    generation: u64,
    closed: bool,
}

impl SessionController {
    /// A new session in the `Loading` phase.
    #[must_use]
    pub fn new(request: SessionRequest, clock: Clock) -> Self {
        Self {
            id: SessionId::random(),
            clock,
            state: SessionState::loading(request),
            generation: 1,
            closed: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> PhaseKind {
        self.state.kind()
    }

    #[must_use]
    pub fn request(&self) -> &SessionRequest {
        self.state.request()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.state.current_index()
    }

    #[must_use]
    pub fn current_item(&self) -> Option<&QuestionItem> {
        self.state.current_item()
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<AnswerOption> {
        self.state.selected_option()
    }

    #[must_use]
    pub fn pending_submission(&self) -> bool {
        self.state.pending_submission()
    }

    #[must_use]
    pub fn last_result(&self) -> Option<GradeOutcome> {
        self.state.last_result()
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.state.stats()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase().is_terminal()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn presentation(&self) -> ResultPresentation<'_> {
        ResultPresentation::new(&self.state)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot::new(&self.state)
    }

    //
    // ─── LOADING ───────────────────────────────────────────────────────────────
    //

    /// Ticket for the pending load, if the session is waiting for one.
    #[must_use]
    pub fn load_ticket(&self) -> Option<LoadTicket> {
        (!self.closed && self.phase() == PhaseKind::Loading).then(|| LoadTicket {
            generation: self.generation,
            request: self.state.request().clone(),
        })
    }

    /// Deliver the loaded questions. An empty list ends the session as `Empty`.
    pub fn finish_load(&mut self, ticket: &LoadTicket, items: Vec<QuestionItem>) -> StepOutcome {
        if !self.is_current(ticket.generation) {
            debug!(session = %self.id, ticket = ticket.generation, live = self.generation, "discarding stale load");
            return StepOutcome::Stale;
        }
        let at = self.clock.now();
        self.apply(SessionEvent::Loaded { items, at })
    }

    //
    // ─── STUDENT INPUT ─────────────────────────────────────────────────────────
    //

    pub fn select_option(&mut self, option: AnswerOption) -> StepOutcome {
        self.apply(SessionEvent::Select(option))
    }

    /// Open a submission for the selected option of the current question.
    ///
    /// Returns `None` without touching the state when nothing is selected or a
    /// submission is already pending.
    pub fn begin_submit(&mut self) -> Option<SubmitTicket> {
        let at = self.clock.now();
        if self.apply(SessionEvent::Submit { at }) != StepOutcome::Applied {
            return None;
        }
        let Phase::Submitting {
            cursor,
            selected,
            elapsed_seconds,
        } = *self.state.phase()
        else {
            return None;
        };
        let question_id = self.state.items().get(cursor.index)?.id();
        // Each submission gets its own generation, so a ticket whose request
        // already failed cannot resolve a later retry.
        self.generation += 1;
        Some(SubmitTicket {
            generation: self.generation,
            submission: AnswerSubmission {
                question_id,
                selected,
                elapsed_seconds,
            },
        })
    }

    /// Resolve the outstanding submission with the grading response.
    pub fn finish_submit(
        &mut self,
        ticket: &SubmitTicket,
        response: Result<GradeOutcome, GradingError>,
    ) -> SubmitOutcome {
        if !self.is_current(ticket.generation) || !self.pending_submission() {
            debug!(session = %self.id, ticket = ticket.generation, live = self.generation, "discarding stale grading response");
            return SubmitOutcome::Stale;
        }

        let at = self.clock.now();
        match response {
            Ok(outcome) => {
                self.apply(SessionEvent::Graded(outcome));
                SubmitOutcome::Graded(outcome)
            }
            Err(error) => {
                let skipped = error.is_duplicate();
                self.apply(SessionEvent::Rejected {
                    error: error.clone(),
                    at,
                });
                if skipped {
                    SubmitOutcome::Skipped
                } else {
                    SubmitOutcome::Failed(error)
                }
            }
        }
    }

    /// Dismiss the shown result and move to the next question, or complete.
    pub fn acknowledge_result(&mut self) -> StepOutcome {
        let at = self.clock.now();
        self.apply(SessionEvent::Acknowledge { at })
    }

    /// Step back one question. Does not touch the statistics.
    pub fn go_to_previous(&mut self) -> StepOutcome {
        let at = self.clock.now();
        self.apply(SessionEvent::Previous { at })
    }

    //
    // ─── LIFECYCLE ─────────────────────────────────────────────────────────────
    //

    /// Throw the current run away and wait for a fresh load.
    pub fn restart(&mut self) -> LoadTicket {
        self.closed = false;
        self.apply(SessionEvent::Restart);
        LoadTicket {
            generation: self.generation,
            request: self.state.request().clone(),
        }
    }

    /// Invalidate every outstanding ticket; later responses are dropped.
    pub fn teardown(&mut self) {
        self.closed = true;
        self.generation += 1;
        debug!(session = %self.id, generation = self.generation, "session torn down");
    }

    fn is_current(&self, generation: u64) -> bool {
        !self.closed && generation == self.generation
    }

    fn apply(&mut self, event: SessionEvent) -> StepOutcome {
        if self.closed {
            return StepOutcome::Ignored;
        }

        let before = (self.phase(), self.current_index());
        let label = event_label(&event);
        let placeholder = SessionState::loading(self.state.request().clone());
        let state = std::mem::replace(&mut self.state, placeholder);

        match step(state, event) {
            Ok(next) => {
                self.state = next;
                let after = (self.phase(), self.current_index());
                if after.0 == PhaseKind::Loading || after.1 != before.1 {
                    self.generation += 1;
                }
                debug!(
                    session = %self.id,
                    event = label,
                    from = ?before.0,
                    to = ?after.0,
                    index = after.1,
                    "session transition"
                );
                if after.0 == PhaseKind::Completed && before.0 != PhaseKind::Completed {
                    let stats = self.stats();
                    info!(
                        session = %self.id,
                        correct = stats.correct_count,
                        answered = stats.total_answered,
                        percentage = stats.percentage(),
                        "session completed"
                    );
                }
                StepOutcome::Applied
            }
            Err(unchanged) => {
                self.state = unchanged;
                debug!(session = %self.id, event = label, phase = ?before.0, "event ignored");
                StepOutcome::Ignored
            }
        }
    }
}

fn event_label(event: &SessionEvent) -> &'static str {
    match event {
        SessionEvent::Loaded { .. } => "loaded",
        SessionEvent::Select(_) => "select",
        SessionEvent::Submit { .. } => "submit",
        SessionEvent::Graded(_) => "graded",
        SessionEvent::Rejected { .. } => "rejected",
        SessionEvent::Acknowledge { .. } => "acknowledge",
        SessionEvent::Previous { .. } => "previous",
        SessionEvent::Restart => "restart",
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .field("items_len", &self.state.total_items())
            .field("current_index", &self.current_index())
            .field("stats", &self.stats())
            .field("generation", &self.generation)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use revise_core::model::QuestionId;
    use revise_core::time::{fixed_clock, fixed_now};

    fn items(n: u64) -> Vec<QuestionItem> {
        (1..=n)
            .map(|id| {
                QuestionItem::new(
                    QuestionId::new(id),
                    "Fractions",
                    format!("Q{id}"),
                    ["a", "b", "c", "d"].map(String::from),
                )
                .unwrap()
            })
            .collect()
    }

    fn started(n: u64) -> SessionController {
        let mut controller = SessionController::new(
            SessionRequest::chapter_practice("Fractions").unwrap(),
            fixed_clock(),
        );
        let ticket = controller.load_ticket().unwrap();
        assert_eq!(controller.finish_load(&ticket, items(n)), StepOutcome::Applied);
        controller
    }

    fn answer(
        controller: &mut SessionController,
        option: AnswerOption,
        response: Result<GradeOutcome, GradingError>,
    ) -> SubmitOutcome {
        controller.select_option(option);
        let ticket = controller.begin_submit().expect("submission opened");
        controller.finish_submit(&ticket, response)
    }

    #[test]
    fn scenario_a_three_items() {
        let mut c = started(3);

        answer(&mut c, AnswerOption::FIRST, Ok(GradeOutcome::correct()));
        assert_eq!(c.acknowledge_result(), StepOutcome::Applied);
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.stats(), SessionStats::new(1, 1));

        let outcome = answer(
            &mut c,
            AnswerOption::SECOND,
            Ok(GradeOutcome::incorrect(AnswerOption::THIRD)),
        );
        assert_eq!(
            outcome,
            SubmitOutcome::Graded(GradeOutcome::incorrect(AnswerOption::THIRD))
        );
        c.acknowledge_result();
        assert_eq!(c.current_index(), 2);
        assert_eq!(c.stats(), SessionStats::new(1, 2));
        assert_eq!(c.stats().percentage(), 50);

        answer(&mut c, AnswerOption::FIRST, Ok(GradeOutcome::correct()));
        c.acknowledge_result();
        assert_eq!(c.phase(), PhaseKind::Completed);
        assert_eq!(c.current_index(), 3);
        assert_eq!(c.stats(), SessionStats::new(2, 3));
        assert_eq!(c.stats().percentage(), 67);
    }

    #[test]
    fn scenario_b_duplicate_skips_without_result() {
        let mut c = started(3);
        let outcome = answer(
            &mut c,
            AnswerOption::FIRST,
            Err(GradingError::DuplicateSubmission),
        );
        assert_eq!(outcome, SubmitOutcome::Skipped);
        assert_eq!(c.phase(), PhaseKind::Active);
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.stats(), SessionStats::default());
        assert_eq!(c.last_result(), None);
        assert!(!c.presentation().is_result_pending());
    }

    #[test]
    fn scenario_d_previous_navigation() {
        let mut c = started(3);
        c.select_option(AnswerOption::SECOND);
        assert_eq!(c.go_to_previous(), StepOutcome::Ignored);
        assert_eq!(c.current_index(), 0);
        assert_eq!(c.selected_option(), Some(AnswerOption::SECOND));

        answer(&mut c, AnswerOption::SECOND, Ok(GradeOutcome::correct()));
        c.acknowledge_result();
        assert_eq!(c.current_index(), 1);

        c.select_option(AnswerOption::FOURTH);
        assert_eq!(c.go_to_previous(), StepOutcome::Applied);
        assert_eq!(c.current_index(), 0);
        assert_eq!(c.selected_option(), None);
        assert_eq!(c.last_result(), None);
        assert_eq!(c.stats(), SessionStats::new(1, 1));
    }

    #[test]
    fn revisited_question_can_be_counted_twice() {
        let mut c = started(2);
        answer(&mut c, AnswerOption::FIRST, Ok(GradeOutcome::correct()));
        c.acknowledge_result();
        c.go_to_previous();
        answer(&mut c, AnswerOption::FIRST, Ok(GradeOutcome::correct()));
        assert_eq!(c.stats(), SessionStats::new(2, 2));
    }

    #[test]
    fn submit_without_selection_changes_nothing() {
        let mut c = started(2);
        let generation = c.generation();
        assert!(c.begin_submit().is_none());
        assert!(!c.pending_submission());
        assert_eq!(c.current_index(), 0);
        assert_eq!(c.stats(), SessionStats::default());
        assert_eq!(c.generation(), generation);
    }

    #[test]
    fn reentrant_submit_is_rejected() {
        let mut c = started(2);
        c.select_option(AnswerOption::FIRST);
        let first = c.begin_submit().unwrap();
        assert!(c.begin_submit().is_none());
        assert_eq!(c.go_to_previous(), StepOutcome::Ignored);
        assert!(c.pending_submission());
        assert!(!c.presentation().accepts_input());
        assert!(matches!(
            c.finish_submit(&first, Ok(GradeOutcome::correct())),
            SubmitOutcome::Graded(_)
        ));
    }

    #[test]
    fn transport_error_allows_retry_with_same_selection() {
        let mut c = started(2);
        let outcome = answer(
            &mut c,
            AnswerOption::THIRD,
            Err(GradingError::Transport("reset".into())),
        );
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(c.selected_option(), Some(AnswerOption::THIRD));
        assert!(!c.pending_submission());

        let retry = c.begin_submit().unwrap();
        assert_eq!(retry.submission().selected, AnswerOption::THIRD);
    }

    #[test]
    fn superseded_ticket_is_stale() {
        let mut c = started(2);
        c.select_option(AnswerOption::FIRST);
        let first = c.begin_submit().unwrap();
        let failed = c.finish_submit(&first, Err(GradingError::Transport("timeout".into())));
        assert!(matches!(failed, SubmitOutcome::Failed(_)));

        c.select_option(AnswerOption::SECOND);
        let second = c.begin_submit().unwrap();
        assert_ne!(first.generation(), second.generation());

        assert_eq!(
            c.finish_submit(&first, Ok(GradeOutcome::correct())),
            SubmitOutcome::Stale
        );
        assert!(c.pending_submission());
        assert_eq!(c.stats(), SessionStats::default());
        assert!(c.state().answers().is_empty());

        let outcome = c.finish_submit(&second, Ok(GradeOutcome::incorrect(AnswerOption::FIRST)));
        assert!(matches!(outcome, SubmitOutcome::Graded(g) if !g.is_correct()));
        assert_eq!(c.state().answers()[0].selected, AnswerOption::SECOND);
        assert_eq!(c.stats(), SessionStats::new(0, 1));
    }

    #[test]
    fn elapsed_time_comes_from_the_clock() {
        let mut c = SessionController::new(
            SessionRequest::chapter_practice("Fractions").unwrap(),
            fixed_clock(),
        );
        let ticket = c.load_ticket().unwrap();
        c.finish_load(&ticket, items(1));
        c.clock.advance(Duration::seconds(25));
        c.select_option(AnswerOption::FIRST);
        let submit = c.begin_submit().unwrap();
        assert_eq!(submit.submission().elapsed_seconds, 25);
        assert_eq!(submit.submission().question_id, QuestionId::new(1));
        assert_eq!(c.state().question_started_at(), Some(fixed_now()));
    }

    #[test]
    fn empty_load_never_becomes_active() {
        let mut c = started(0);
        assert_eq!(c.phase(), PhaseKind::Empty);
        assert_eq!(c.select_option(AnswerOption::FIRST), StepOutcome::Ignored);
        assert!(c.begin_submit().is_none());
        assert_eq!(c.phase(), PhaseKind::Empty);
    }

    #[test]
    fn stale_grading_response_is_discarded_after_teardown() {
        let mut c = started(2);
        c.select_option(AnswerOption::FIRST);
        let ticket = c.begin_submit().unwrap();
        c.teardown();
        assert_eq!(
            c.finish_submit(&ticket, Ok(GradeOutcome::correct())),
            SubmitOutcome::Stale
        );
        assert_eq!(c.stats(), SessionStats::default());
        assert!(c.is_closed());
    }

    #[test]
    fn stale_load_is_discarded_after_restart() {
        let mut c = SessionController::new(
            SessionRequest::chapter_practice("Fractions").unwrap(),
            fixed_clock(),
        );
        let old = c.load_ticket().unwrap();
        let fresh = c.restart();
        assert_ne!(old.generation(), fresh.generation());

        assert_eq!(c.finish_load(&old, items(3)), StepOutcome::Stale);
        assert_eq!(c.phase(), PhaseKind::Loading);
        assert_eq!(c.finish_load(&fresh, items(1)), StepOutcome::Applied);
        assert_eq!(c.state().total_items(), 1);
    }

    #[test]
    fn ticket_from_before_a_restart_is_stale() {
        let mut c = started(2);
        c.select_option(AnswerOption::FIRST);
        let ticket = c.begin_submit().unwrap();
        let reload = c.restart();
        c.finish_load(&reload, items(2));
        assert_eq!(
            c.finish_submit(&ticket, Err(GradingError::DuplicateSubmission)),
            SubmitOutcome::Stale
        );
        assert_eq!(c.current_index(), 0);
    }
}
