use thiserror::Error;

/// Validation errors for the revision domain model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    #[error("answer option must be between 1 and 4, got {0}")]
    InvalidOption(u8),

    #[error("chapter practice requires a chapter")]
    MissingChapter,

    #[error("question prompt cannot be empty")]
    EmptyPrompt,
}
