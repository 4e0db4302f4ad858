#![forbid(unsafe_code)]

pub mod config;
pub mod http;
pub mod repository;

pub use config::{ApiConfig, ApiConfigError};
pub use http::HttpApi;
pub use repository::{
    GradingClient, GradingError, InMemoryQuestionBank, QuestionSource, Remote, SourceError,
};
