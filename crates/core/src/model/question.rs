use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ModelError;
use crate::model::ids::QuestionId;

//
// ─── ANSWER OPTION ─────────────────────────────────────────────────────────────
//

/// One of the four answer slots of a QCM, numbered 1 to 4.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AnswerOption(u8);

impl AnswerOption {
    pub const FIRST: Self = Self(1);
    pub const SECOND: Self = Self(2);
    pub const THIRD: Self = Self(3);
    pub const FOURTH: Self = Self(4);

    /// # Errors
    ///
    /// Returns `ModelError::InvalidOption` if `value` is not in `1..=4`.
    pub fn new(value: u8) -> Result<Self, ModelError> {
        if (1..=4).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ModelError::InvalidOption(value))
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// All four options in display order.
    #[must_use]
    pub fn all() -> [Self; 4] {
        [Self::FIRST, Self::SECOND, Self::THIRD, Self::FOURTH]
    }

    fn slot(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for AnswerOption {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AnswerOption> for u8 {
    fn from(option: AnswerOption) -> Self {
        option.0
    }
}

impl fmt::Debug for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnswerOption({})", self.0)
    }
}

impl fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── QUESTION ITEM ─────────────────────────────────────────────────────────────
//

/// A question as shown to the student.
///
/// The correct option is never part of this type; it only comes back from
/// grading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionItem {
    id: QuestionId,
    chapter: String,
    prompt: String,
    options: [String; 4],
}

impl QuestionItem {
    /// # Errors
    ///
    /// Returns `ModelError::EmptyPrompt` if the prompt is blank.
    pub fn new(
        id: QuestionId,
        chapter: impl Into<String>,
        prompt: impl Into<String>,
        options: [String; 4],
    ) -> Result<Self, ModelError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(ModelError::EmptyPrompt);
        }
        Ok(Self {
            id,
            chapter: chapter.into(),
            prompt,
            options,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn option_text(&self, option: AnswerOption) -> &str {
        &self.options[option.slot()]
    }

    /// Options paired with their texts, in display order.
    pub fn options(&self) -> impl Iterator<Item = (AnswerOption, &str)> {
        AnswerOption::all()
            .into_iter()
            .map(|option| (option, self.option_text(option)))
    }
}
