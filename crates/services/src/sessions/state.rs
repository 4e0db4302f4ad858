use chrono::{DateTime, Utc};

use revise_core::SessionStats;
use revise_core::model::{AnswerOption, GradeOutcome, QuestionId, QuestionItem, SessionRequest};
use revise_core::stats::progress_percent;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Position on the current question and when it was put on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub index: usize,
    pub started_at: DateTime<Utc>,
}

impl Cursor {
    #[must_use]
    pub fn new(index: usize, started_at: DateTime<Utc>) -> Self {
        Self { index, started_at }
    }
}

/// Where the session is in its lifecycle.
///
/// Each variant carries exactly the data that is meaningful in that phase, so
/// e.g. a result cannot be shown while a submission is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Empty,
    Active {
        cursor: Cursor,
        selected: Option<AnswerOption>,
    },
    Submitting {
        cursor: Cursor,
        selected: AnswerOption,
        elapsed_seconds: u32,
    },
    ShowingResult {
        cursor: Cursor,
        selected: AnswerOption,
        result: GradeOutcome,
    },
    Completed,
}

/// Fieldless mirror of `Phase` for cheap comparisons and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Loading,
    Empty,
    Active,
    Submitting,
    ShowingResult,
    Completed,
}

impl Phase {
    #[must_use]
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Loading => PhaseKind::Loading,
            Phase::Empty => PhaseKind::Empty,
            Phase::Active { .. } => PhaseKind::Active,
            Phase::Submitting { .. } => PhaseKind::Submitting,
            Phase::ShowingResult { .. } => PhaseKind::ShowingResult,
            Phase::Completed => PhaseKind::Completed,
        }
    }

    #[must_use]
    pub fn cursor(&self) -> Option<Cursor> {
        match self {
            Phase::Active { cursor, .. }
            | Phase::Submitting { cursor, .. }
            | Phase::ShowingResult { cursor, .. } => Some(*cursor),
            Phase::Loading | Phase::Empty | Phase::Completed => None,
        }
    }
}

impl PhaseKind {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, PhaseKind::Empty | PhaseKind::Completed)
    }
}

//
// ─── ANSWER LOG ────────────────────────────────────────────────────────────────
//

/// A graded submission, kept for the end-of-session summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub selected: AnswerOption,
    pub elapsed_seconds: u32,
    pub outcome: GradeOutcome,
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Everything the engine knows about one session.
///
/// Only `transition` produces new states; accessors derive the flat view
/// (`current_index`, `selected_option`, ...) from the phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) request: SessionRequest,
    pub(crate) items: Vec<QuestionItem>,
    pub(crate) phase: Phase,
    pub(crate) stats: SessionStats,
    pub(crate) answers: Vec<AnswerRecord>,
}

impl SessionState {
    #[must_use]
    pub fn loading(request: SessionRequest) -> Self {
        Self {
            request,
            items: Vec::new(),
            phase: Phase::Loading,
            stats: SessionStats::default(),
            answers: Vec::new(),
        }
    }

    #[must_use]
    pub fn request(&self) -> &SessionRequest {
        &self.request
    }

    #[must_use]
    pub fn items(&self) -> &[QuestionItem] {
        &self.items
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    #[must_use]
    pub fn total_items(&self) -> usize {
        self.items.len()
    }

    /// Index of the question on screen; `total_items()` once completed.
    #[must_use]
    pub fn current_index(&self) -> usize {
        match &self.phase {
            Phase::Completed => self.items.len(),
            phase => phase.cursor().map_or(0, |cursor| cursor.index),
        }
    }

    #[must_use]
    pub fn current_item(&self) -> Option<&QuestionItem> {
        self.phase
            .cursor()
            .and_then(|cursor| self.items.get(cursor.index))
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<AnswerOption> {
        match &self.phase {
            Phase::Active { selected, .. } => *selected,
            Phase::Submitting { selected, .. } | Phase::ShowingResult { selected, .. } => {
                Some(*selected)
            }
            Phase::Loading | Phase::Empty | Phase::Completed => None,
        }
    }

    #[must_use]
    pub fn question_started_at(&self) -> Option<DateTime<Utc>> {
        self.phase.cursor().map(|cursor| cursor.started_at)
    }

    #[must_use]
    pub fn pending_submission(&self) -> bool {
        self.kind() == PhaseKind::Submitting
    }

    #[must_use]
    pub fn last_result(&self) -> Option<GradeOutcome> {
        match &self.phase {
            Phase::ShowingResult { result, .. } => Some(*result),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_last_item(&self) -> bool {
        self.phase
            .cursor()
            .is_some_and(|cursor| cursor.index + 1 >= self.items.len())
    }

    /// Position-based progress, `0..=100`.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.current_index(), self.items.len())
    }

    /// Sum of the response times of all graded answers.
    #[must_use]
    pub fn time_spent_seconds(&self) -> u64 {
        self.answers
            .iter()
            .map(|answer| u64::from(answer.elapsed_seconds))
            .sum()
    }
}
