#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use revise_core::Clock;
pub use sessions as session;

pub use error::SessionError;

pub use sessions::{
    CompletionSummary, EmptyReason, Feedback, LoadTicket, ResultPresentation, SessionController,
    SessionLoopService, SessionSnapshot, StepOutcome, SubmitOutcome, SubmitTicket,
};
