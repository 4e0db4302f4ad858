use crate::error::ModelError;

/// Value of the external `mode` parameter that selects review of missed questions.
pub const REVIEW_MODE_PARAM: &str = "revision";

/// Where the questions of a session come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// Every question of one chapter.
    ChapterPractice,
    /// Questions the student previously answered wrong.
    ReviewMissed,
}

/// Immutable parameters of a session, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    mode: SessionMode,
    chapter: Option<String>,
}

impl SessionRequest {
    /// # Errors
    ///
    /// Returns `ModelError::MissingChapter` if `chapter` is blank.
    pub fn chapter_practice(chapter: impl Into<String>) -> Result<Self, ModelError> {
        let chapter = chapter.into();
        if chapter.trim().is_empty() {
            return Err(ModelError::MissingChapter);
        }
        Ok(Self {
            mode: SessionMode::ChapterPractice,
            chapter: Some(chapter),
        })
    }

    /// Review session, optionally narrowed to one chapter.
    #[must_use]
    pub fn review_missed(chapter: Option<String>) -> Self {
        Self {
            mode: SessionMode::ReviewMissed,
            chapter: chapter.filter(|c| !c.trim().is_empty()),
        }
    }

    /// Builds a request from the raw `mode` / `chapter` parameters.
    ///
    /// `"revision"` selects `ReviewMissed`; anything else (including no mode)
    /// selects `ChapterPractice`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::MissingChapter` for chapter practice without a chapter.
    pub fn from_params(mode: Option<&str>, chapter: Option<&str>) -> Result<Self, ModelError> {
        let chapter = chapter.map(str::to_owned);
        if mode == Some(REVIEW_MODE_PARAM) {
            return Ok(Self::review_missed(chapter));
        }
        Self::chapter_practice(chapter.ok_or(ModelError::MissingChapter)?)
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn chapter(&self) -> Option<&str> {
        self.chapter.as_deref()
    }
}
