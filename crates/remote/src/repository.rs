use async_trait::async_trait;
use revise_core::StudentIdentity;
use revise_core::model::{
    AnswerOption, AnswerSubmission, GradeOutcome, QuestionId, QuestionItem, SessionMode,
    SessionRequest, StudentId,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors from fetching a question set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SourceError {
    #[error("not authorized")]
    Unauthorized,

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed question payload: {0}")]
    Decode(String),
}

/// Errors from submitting an answer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GradingError {
    /// The student already answered this question; the server keeps one answer
    /// per question per student.
    #[error("question already answered")]
    DuplicateSubmission,

    #[error("not authorized")]
    Unauthorized,

    #[error("transport error: {0}")]
    Transport(String),
}

impl GradingError {
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateSubmission)
    }
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Supplies the ordered question list for a session.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the questions for `request`, in presentation order.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` for transport, authorization or payload failures.
    async fn load(&self, request: &SessionRequest) -> Result<Vec<QuestionItem>, SourceError>;
}

/// Grades one answer.
#[async_trait]
pub trait GradingClient: Send + Sync {
    /// Submit an answer and return the verdict.
    ///
    /// # Errors
    ///
    /// Returns `GradingError::DuplicateSubmission` when the question was already
    /// answered by this student, other variants for any other failure.
    async fn submit(&self, submission: &AnswerSubmission) -> Result<GradeOutcome, GradingError>;
}

//
// ─── IN-MEMORY BANK ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct BankEntry {
    item: QuestionItem,
    correct: AnswerOption,
}

#[derive(Default)]
struct BankState {
    entries: Vec<BankEntry>,
    answered: HashSet<(StudentId, QuestionId)>,
    missed: Vec<(StudentId, QuestionId)>,
    fail_loads: bool,
    failing_submissions: usize,
}

/// In-memory question bank implementing both contracts, for tests and demos.
///
/// Enforces one answer per question per student like the real server, and
/// records wrong answers so that review sessions return them.
#[derive(Clone)]
pub struct InMemoryQuestionBank {
    identity: Arc<dyn StudentIdentity>,
    state: Arc<Mutex<BankState>>,
}

impl InMemoryQuestionBank {
    #[must_use]
    pub fn new(identity: Arc<dyn StudentIdentity>) -> Self {
        Self {
            identity,
            state: Arc::new(Mutex::new(BankState::default())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BankState>, String> {
        self.state.lock().map_err(|e| e.to_string())
    }

    /// Add a question with its correct option. Order of insertion is load order.
    pub fn insert(&self, item: QuestionItem, correct: AnswerOption) {
        if let Ok(mut state) = self.lock() {
            state.entries.push(BankEntry { item, correct });
        }
    }

    /// Make every subsequent `load` fail with a transport error.
    pub fn fail_loads(&self, fail: bool) {
        if let Ok(mut state) = self.lock() {
            state.fail_loads = fail;
        }
    }

    /// Make the next `count` submissions fail with a transport error.
    pub fn fail_next_submissions(&self, count: usize) {
        if let Ok(mut state) = self.lock() {
            state.failing_submissions = count;
        }
    }

    /// Mark a question as already answered by `student`, as a prior session would.
    pub fn mark_answered(&self, student: StudentId, question: QuestionId) {
        if let Ok(mut state) = self.lock() {
            state.answered.insert((student, question));
        }
    }

    #[must_use]
    pub fn answered_count(&self, student: StudentId) -> usize {
        self.lock()
            .map(|state| state.answered.iter().filter(|(s, _)| *s == student).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl QuestionSource for InMemoryQuestionBank {
    async fn load(&self, request: &SessionRequest) -> Result<Vec<QuestionItem>, SourceError> {
        let state = self.lock().map_err(SourceError::Transport)?;
        if state.fail_loads {
            return Err(SourceError::Transport("question bank unavailable".into()));
        }
        let in_chapter = |entry: &&BankEntry| {
            request
                .chapter()
                .is_none_or(|chapter| entry.item.chapter() == chapter)
        };

        let items = match request.mode() {
            SessionMode::ChapterPractice => state
                .entries
                .iter()
                .filter(in_chapter)
                .map(|entry| entry.item.clone())
                .collect(),
            SessionMode::ReviewMissed => {
                let student = self
                    .identity
                    .current_student_id()
                    .ok_or(SourceError::Unauthorized)?;
                state
                    .missed
                    .iter()
                    .filter(|(s, _)| *s == student)
                    .filter_map(|(_, id)| state.entries.iter().find(|e| e.item.id() == *id))
                    .filter(in_chapter)
                    .map(|entry| entry.item.clone())
                    .collect()
            }
        };
        Ok(items)
    }
}

#[async_trait]
impl GradingClient for InMemoryQuestionBank {
    async fn submit(&self, submission: &AnswerSubmission) -> Result<GradeOutcome, GradingError> {
        let student = self
            .identity
            .current_student_id()
            .ok_or(GradingError::Unauthorized)?;
        let mut state = self.lock().map_err(GradingError::Transport)?;
        if state.failing_submissions > 0 {
            state.failing_submissions -= 1;
            return Err(GradingError::Transport("grading unavailable".into()));
        }

        let correct = state
            .entries
            .iter()
            .find(|entry| entry.item.id() == submission.question_id)
            .map(|entry| entry.correct)
            .ok_or_else(|| GradingError::Transport(format!(
                "unknown question {}",
                submission.question_id
            )))?;

        if !state.answered.insert((student, submission.question_id)) {
            return Err(GradingError::DuplicateSubmission);
        }

        let is_correct = submission.selected == correct;
        if !is_correct {
            state.missed.push((student, submission.question_id));
        }
        Ok(GradeOutcome::new(is_correct, Some(correct)))
    }
}

/// Aggregates the two remote contracts behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Remote {
    pub questions: Arc<dyn QuestionSource>,
    pub grading: Arc<dyn GradingClient>,
}

impl Remote {
    #[must_use]
    pub fn in_memory(bank: InMemoryQuestionBank) -> Self {
        let questions: Arc<dyn QuestionSource> = Arc::new(bank.clone());
        let grading: Arc<dyn GradingClient> = Arc::new(bank);
        Self { questions, grading }
    }
}
