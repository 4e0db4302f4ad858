use std::env;
use std::time::Duration;

use revise_core::StaticIdentity;
use revise_core::model::StudentId;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiConfigError {
    #[error("invalid API url {raw}: {source}")]
    InvalidUrl {
        raw: String,
        source: url::ParseError,
    },

    #[error("API url must use http or https: {0}")]
    UnsupportedScheme(String),

    #[error("invalid timeout value: {0}")]
    InvalidTimeout(String),

    #[error("invalid student id: {0}")]
    InvalidStudentId(String),

    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

/// Connection settings for the remote revision API.
#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub token: Option<String>,
    pub student_id: Option<StudentId>,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ApiConfigError` if the url is not a valid http(s) url.
    pub fn new(base_url: &str) -> Result<Self, ApiConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token: None,
            student_id: None,
        })
    }

    /// Reads `REVISE_API_URL`, `REVISE_API_TOKEN`, `REVISE_STUDENT_ID` and
    /// `REVISE_TIMEOUT_SECS`, falling back to defaults for unset values.
    ///
    /// # Errors
    ///
    /// Returns `ApiConfigError` when a variable is set but malformed.
    pub fn from_env() -> Result<Self, ApiConfigError> {
        let base_url = env::var("REVISE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let mut config = Self::new(&base_url)?;

        config.token = env::var("REVISE_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        if let Ok(raw) = env::var("REVISE_STUDENT_ID") {
            config.student_id = Some(parse_student_id(&raw)?);
        }

        if let Ok(raw) = env::var("REVISE_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ApiConfigError::InvalidTimeout(raw.clone()))?;
            if secs == 0 {
                return Err(ApiConfigError::InvalidTimeout(raw));
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_student_id(mut self, student_id: Option<StudentId>) -> Self {
        self.student_id = student_id;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The identity described by this configuration.
    #[must_use]
    pub fn identity(&self) -> StaticIdentity {
        StaticIdentity::new(self.student_id, self.token.clone())
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("has_token", &self.token.is_some())
            .field("student_id", &self.student_id)
            .finish()
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ApiConfigError::InvalidUrl {
        raw: raw.to_owned(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ApiConfigError::UnsupportedScheme(raw.to_owned())),
    }
}

/// # Errors
///
/// Returns `ApiConfigError::InvalidStudentId` unless `raw` is an unsigned integer.
pub fn parse_student_id(raw: &str) -> Result<StudentId, ApiConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(StudentId::new)
        .map_err(|_| ApiConfigError::InvalidStudentId(raw.to_owned()))
}
