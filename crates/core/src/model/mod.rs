mod grading;
mod ids;
mod question;
mod request;

pub use grading::{AnswerSubmission, GradeOutcome};
pub use ids::{QuestionId, SessionId, StudentId};
pub use question::{AnswerOption, QuestionItem};
pub use request::{REVIEW_MODE_PARAM, SessionMode, SessionRequest};
