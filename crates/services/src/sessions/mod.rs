mod controller;
mod presentation;
mod state;
mod transition;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{LoadTicket, SessionController, StepOutcome, SubmitOutcome, SubmitTicket};
pub use presentation::{Feedback, ResultPresentation};
pub use state::{AnswerRecord, Cursor, Phase, PhaseKind, SessionState};
pub use transition::{SessionEvent, transition};
pub use view::{CompletionSummary, EmptyReason, SessionSnapshot};
pub use workflow::SessionLoopService;
