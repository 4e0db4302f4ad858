use std::sync::Arc;

use remote::{ApiConfig, GradingClient, GradingError, QuestionSource, Remote};
use revise_core::model::{GradeOutcome, QuestionItem, SessionRequest};
use revise_core::{Clock, StudentIdentity};
use tracing::{info, instrument, warn};

use crate::error::SessionError;

use super::controller::{LoadTicket, SessionController, StepOutcome, SubmitOutcome, SubmitTicket};

/// Runs the network side of a session: loading questions and grading answers.
///
/// The `load` / `grade` calls only need a ticket, so a UI can keep the
/// controller responsive while they are in flight. `start_session`,
/// `reload` and `submit_current` chain open, call and resolve for
/// sequential callers.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    questions: Arc<dyn QuestionSource>,
    grading: Arc<dyn GradingClient>,
    identity: Arc<dyn StudentIdentity>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionSource>,
        grading: Arc<dyn GradingClient>,
        identity: Arc<dyn StudentIdentity>,
    ) -> Self {
        Self {
            clock,
            questions,
            grading,
            identity,
        }
    }

    #[must_use]
    pub fn from_remote(clock: Clock, remote: &Remote, identity: Arc<dyn StudentIdentity>) -> Self {
        Self::new(
            clock,
            Arc::clone(&remote.questions),
            Arc::clone(&remote.grading),
            identity,
        )
    }

    /// Service backed by the HTTP API, acting as the student from `config`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Config` when the HTTP client cannot be built.
    pub fn http(clock: Clock, config: &ApiConfig) -> Result<Self, SessionError> {
        let identity: Arc<dyn StudentIdentity> = Arc::new(config.identity());
        let remote = Remote::http(config, Arc::clone(&identity))?;
        Ok(Self::from_remote(clock, &remote, identity))
    }

    /// Parse raw `mode` / `chapter` parameters and start a session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Request` when practice mode has no chapter.
    pub async fn start_from_params(
        &self,
        mode: Option<&str>,
        chapter: Option<&str>,
    ) -> Result<SessionController, SessionError> {
        let request = SessionRequest::from_params(mode, chapter)?;
        Ok(self.start_session(request).await)
    }

    /// Create a session for `request` and load its questions.
    ///
    /// A failed load is logged and ends the session as `Empty`.
    #[instrument(skip(self, request), fields(mode = ?request.mode(), student = ?self.identity.current_student_id()))]
    pub async fn start_session(&self, request: SessionRequest) -> SessionController {
        let mut controller = SessionController::new(request, self.clock);
        if let Some(ticket) = controller.load_ticket() {
            let items = self.load(&ticket).await;
            controller.finish_load(&ticket, items);
        }
        info!(
            session = %controller.id(),
            phase = ?controller.phase(),
            items = controller.state().total_items(),
            "session started"
        );
        controller
    }

    /// Restart `controller` from a fresh load of the same request.
    pub async fn reload(&self, controller: &mut SessionController) -> StepOutcome {
        let ticket = controller.restart();
        let items = self.load(&ticket).await;
        controller.finish_load(&ticket, items)
    }

    /// Fetch the questions for a load ticket. Failures degrade to no questions.
    pub async fn load(&self, ticket: &LoadTicket) -> Vec<QuestionItem> {
        match self.questions.load(ticket.request()).await {
            Ok(items) => items,
            Err(error) => {
                warn!(generation = ticket.generation(), %error, "question load failed; treating as empty");
                Vec::new()
            }
        }
    }

    /// Send the ticket's answer for grading.
    ///
    /// # Errors
    ///
    /// Returns the `GradingError` from the grading client unchanged; the
    /// controller decides what it means for the session.
    pub async fn grade(&self, ticket: &SubmitTicket) -> Result<GradeOutcome, GradingError> {
        let result = self.grading.submit(ticket.submission()).await;
        match &result {
            Err(GradingError::DuplicateSubmission) => {
                info!(question = %ticket.submission().question_id, "question already answered; skipping");
            }
            Err(error) => {
                warn!(question = %ticket.submission().question_id, %error, "grading failed");
            }
            Ok(_) => {}
        }
        result
    }

    /// Submit the selected option of the current question and apply the response.
    #[instrument(skip_all, fields(session = %controller.id()))]
    pub async fn submit_current(&self, controller: &mut SessionController) -> SubmitOutcome {
        let Some(ticket) = controller.begin_submit() else {
            return SubmitOutcome::Ignored;
        };
        let response = self.grade(&ticket).await;
        controller.finish_submit(&ticket, response)
    }
}
