//! `reqwest` implementation of the remote contracts.

mod mapping;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use revise_core::StudentIdentity;
use revise_core::model::{
    AnswerSubmission, GradeOutcome, QuestionItem, SessionMode, SessionRequest,
};
use tracing::{debug, instrument};

use crate::config::{ApiConfig, ApiConfigError};
use crate::repository::{GradingClient, GradingError, QuestionSource, Remote, SourceError};
use mapping::{
    ChapterQuestionsResponse, ReviewQuestionsResponse, SubmitAnswerBody, SubmitAnswerResponse,
};

const CHAPTER_QUESTIONS_PATH: &str = "eleve/qcm";
const REVIEW_QUESTIONS_PATH: &str = "eleve/revision";
const SUBMIT_ANSWER_PATH: &str = "eleve/reponse";

/// Client for the student endpoints of the revision API.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    identity: Arc<dyn StudentIdentity>,
}

impl HttpApi {
    /// # Errors
    ///
    /// Returns `ApiConfigError::Client` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, identity: Arc<dyn StudentIdentity>) -> Result<Self, ApiConfigError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.as_str().trim_end_matches('/').to_owned(),
            identity,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.identity.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch(&self, request: &SessionRequest) -> Result<reqwest::Response, SourceError> {
        let path = match request.mode() {
            SessionMode::ChapterPractice => CHAPTER_QUESTIONS_PATH,
            SessionMode::ReviewMissed => REVIEW_QUESTIONS_PATH,
        };
        let mut builder = self.client.get(self.endpoint(path));
        if let Some(chapter) = request.chapter() {
            builder = builder.query(&[("chapitre", chapter)]);
        }

        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(SourceError::Unauthorized),
            status => Err(SourceError::Status(status.as_u16())),
        }
    }
}

#[async_trait]
impl QuestionSource for HttpApi {
    #[instrument(skip(self, request), fields(mode = ?request.mode(), chapter = ?request.chapter()))]
    async fn load(&self, request: &SessionRequest) -> Result<Vec<QuestionItem>, SourceError> {
        let response = self.fetch(request).await?;
        let records = match request.mode() {
            SessionMode::ChapterPractice => {
                response
                    .json::<ChapterQuestionsResponse>()
                    .await
                    .map_err(|e| SourceError::Decode(e.to_string()))?
                    .qcms
            }
            SessionMode::ReviewMissed => {
                response
                    .json::<ReviewQuestionsResponse>()
                    .await
                    .map_err(|e| SourceError::Decode(e.to_string()))?
                    .questions
            }
        };
        debug!(count = records.len(), "questions fetched");

        records
            .into_iter()
            .map(|record| record.into_item(request.chapter()))
            .collect()
    }
}

#[async_trait]
impl GradingClient for HttpApi {
    #[instrument(skip(self), fields(question = %submission.question_id))]
    async fn submit(&self, submission: &AnswerSubmission) -> Result<GradeOutcome, GradingError> {
        let response = self
            .authorize(self.client.post(self.endpoint(SUBMIT_ANSWER_PATH)))
            .json(&SubmitAnswerBody::from(submission))
            .send()
            .await
            .map_err(|e| GradingError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let body: SubmitAnswerResponse = response
                    .json()
                    .await
                    .map_err(|e| GradingError::Transport(e.to_string()))?;
                Ok(body.into_outcome())
            }
            StatusCode::BAD_REQUEST => Err(GradingError::DuplicateSubmission),
            StatusCode::UNAUTHORIZED => Err(GradingError::Unauthorized),
            status => Err(GradingError::Transport(format!(
                "server responded with status {status}"
            ))),
        }
    }
}

impl Remote {
    /// Build a `Remote` backed by the HTTP API.
    ///
    /// # Errors
    ///
    /// Returns `ApiConfigError` if the HTTP client cannot be built.
    pub fn http(config: &ApiConfig, identity: Arc<dyn StudentIdentity>) -> Result<Self, ApiConfigError> {
        let api = Arc::new(HttpApi::new(config, identity)?);
        let questions: Arc<dyn QuestionSource> = api.clone();
        let grading: Arc<dyn GradingClient> = api;
        Ok(Self { questions, grading })
    }
}
