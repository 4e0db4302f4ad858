//! Pure transition function of the session state machine.

use chrono::{DateTime, Utc};

use remote::GradingError;
use revise_core::model::{AnswerOption, GradeOutcome, QuestionItem};
use revise_core::time;

use super::state::{AnswerRecord, Cursor, Phase, SessionState};

/// Everything that can happen to a session.
///
/// Timestamps travel with the events so that `transition` never reads a clock.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Loaded {
        items: Vec<QuestionItem>,
        at: DateTime<Utc>,
    },
    Select(AnswerOption),
    Submit {
        at: DateTime<Utc>,
    },
    Graded(GradeOutcome),
    Rejected {
        error: GradingError,
        at: DateTime<Utc>,
    },
    Acknowledge {
        at: DateTime<Utc>,
    },
    Previous {
        at: DateTime<Utc>,
    },
    Restart,
}

/// Applies `event` to `state`.
///
/// Events that the current phase does not accept leave the state unchanged.
#[must_use]
pub fn transition(state: SessionState, event: SessionEvent) -> SessionState {
    step(state, event).unwrap_or_else(|unchanged| unchanged)
}

/// Like `transition`, but reports an ignored event as `Err` carrying the
/// untouched state.
pub(crate) fn step(mut state: SessionState, event: SessionEvent) -> Result<SessionState, SessionState> {
    let next = match (state.phase, event) {
        (_, SessionEvent::Restart) => {
            return Ok(SessionState::loading(state.request));
        }

        (Phase::Loading, SessionEvent::Loaded { items, at }) => {
            state.items = items;
            if state.items.is_empty() {
                Phase::Empty
            } else {
                Phase::Active {
                    cursor: Cursor::new(0, at),
                    selected: None,
                }
            }
        }

        (Phase::Active { cursor, .. }, SessionEvent::Select(option)) => Phase::Active {
            cursor,
            selected: Some(option),
        },

        (
            Phase::Active {
                cursor,
                selected: Some(selected),
            },
            SessionEvent::Submit { at },
        ) => Phase::Submitting {
            cursor,
            selected,
            elapsed_seconds: time::elapsed_seconds(cursor.started_at, at),
        },

        (
            Phase::Submitting {
                cursor,
                selected,
                elapsed_seconds,
            },
            SessionEvent::Graded(result),
        ) => {
            state.stats = state.stats.record(&result);
            if let Some(item) = state.items.get(cursor.index) {
                state.answers.push(AnswerRecord {
                    question_id: item.id(),
                    selected,
                    elapsed_seconds,
                    outcome: result,
                });
            }
            Phase::ShowingResult {
                cursor,
                selected,
                result,
            }
        }

        // Already answered in an earlier session: skip silently, stats untouched.
        (
            Phase::Submitting { cursor, .. },
            SessionEvent::Rejected {
                error: GradingError::DuplicateSubmission,
                at,
            },
        ) => advance(cursor.index, state.items.len(), at),

        (Phase::Submitting { cursor, selected, .. }, SessionEvent::Rejected { .. }) => {
            Phase::Active {
                cursor,
                selected: Some(selected),
            }
        }

        (Phase::ShowingResult { cursor, .. }, SessionEvent::Acknowledge { at }) => {
            advance(cursor.index, state.items.len(), at)
        }

        (Phase::Active { cursor, .. }, SessionEvent::Previous { at }) if cursor.index > 0 => {
            Phase::Active {
                cursor: Cursor::new(cursor.index - 1, at),
                selected: None,
            }
        }

        _ => return Err(state),
    };

    state.phase = next;
    Ok(state)
}

fn advance(index: usize, len: usize, at: DateTime<Utc>) -> Phase {
    let next = index + 1;
    if next < len {
        Phase::Active {
            cursor: Cursor::new(next, at),
            selected: None,
        }
    } else {
        Phase::Completed
    }
}
