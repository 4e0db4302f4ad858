use crate::model::ids::QuestionId;
use crate::model::question::AnswerOption;

/// One answer sent for grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerSubmission {
    pub question_id: QuestionId,
    pub selected: AnswerOption,
    pub elapsed_seconds: u32,
}

/// Grading verdict for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeOutcome {
    correct: bool,
    canonical_answer: Option<AnswerOption>,
}

impl GradeOutcome {
    /// Canonical answer is only kept for incorrect answers.
    #[must_use]
    pub fn new(correct: bool, canonical_answer: Option<AnswerOption>) -> Self {
        Self {
            correct,
            canonical_answer: canonical_answer.filter(|_| !correct),
        }
    }

    #[must_use]
    pub fn correct() -> Self {
        Self::new(true, None)
    }

    #[must_use]
    pub fn incorrect(canonical_answer: AnswerOption) -> Self {
        Self::new(false, Some(canonical_answer))
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.correct
    }

    #[must_use]
    pub fn canonical_answer(&self) -> Option<AnswerOption> {
        self.canonical_answer
    }
}
