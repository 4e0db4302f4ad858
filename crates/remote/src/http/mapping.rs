//! Wire records of the revision API and their conversion to domain types.

use revise_core::model::{AnswerOption, AnswerSubmission, GradeOutcome, QuestionId, QuestionItem};
use serde::{Deserialize, Serialize};

use crate::repository::SourceError;

/// One question as returned by both list endpoints.
///
/// Any extra field the server sends (including the correct answer on some
/// deployments) is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct QuestionRecord {
    id: u64,
    question: String,
    reponse_1: String,
    reponse_2: String,
    reponse_3: String,
    reponse_4: String,
    #[serde(default)]
    id_chapitre: Option<String>,
}

impl QuestionRecord {
    /// Falls back to the requested chapter when the record has no label.
    pub(crate) fn into_item(self, fallback_chapter: Option<&str>) -> Result<QuestionItem, SourceError> {
        let chapter = self
            .id_chapitre
            .filter(|c| !c.trim().is_empty())
            .or_else(|| fallback_chapter.map(str::to_owned))
            .unwrap_or_default();
        QuestionItem::new(
            QuestionId::new(self.id),
            chapter,
            self.question,
            [self.reponse_1, self.reponse_2, self.reponse_3, self.reponse_4],
        )
        .map_err(|e| SourceError::Decode(format!("question {}: {e}", self.id)))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChapterQuestionsResponse {
    pub(crate) qcms: Vec<QuestionRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewQuestionsResponse {
    pub(crate) questions: Vec<QuestionRecord>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitAnswerBody {
    qcm_id: u64,
    reponse: u8,
    temps_reponse: u32,
}

impl From<&AnswerSubmission> for SubmitAnswerBody {
    fn from(submission: &AnswerSubmission) -> Self {
        Self {
            qcm_id: submission.question_id.value(),
            reponse: submission.selected.value(),
            temps_reponse: submission.elapsed_seconds,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitAnswerResponse {
    correcte: bool,
    #[serde(default)]
    bonne_reponse: Option<u8>,
}

impl SubmitAnswerResponse {
    /// An out-of-range canonical answer is dropped rather than failing the grade.
    pub(crate) fn into_outcome(self) -> GradeOutcome {
        let canonical = self.bonne_reponse.and_then(|v| AnswerOption::new(v).ok());
        if self.bonne_reponse.is_some() && canonical.is_none() {
            tracing::warn!(value = ?self.bonne_reponse, "ignoring invalid canonical answer");
        }
        GradeOutcome::new(self.correcte, canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_without_chapter_uses_fallback() {
        let record: QuestionRecord = serde_json::from_value(serde_json::json!({
            "id": 4,
            "question": "2 + 2 ?",
            "reponse_1": "3", "reponse_2": "4", "reponse_3": "5", "reponse_4": "22",
            "bonne_reponse": 2
        }))
        .unwrap();
        let item = record.into_item(Some("Arithmetic")).unwrap();
        assert_eq!(item.chapter(), "Arithmetic");
        assert_eq!(item.option_text(AnswerOption::SECOND), "4");
    }

    #[test]
    fn empty_prompt_is_a_decode_error() {
        let record: QuestionRecord = serde_json::from_value(serde_json::json!({
            "id": 5, "question": "",
            "reponse_1": "a", "reponse_2": "b", "reponse_3": "c", "reponse_4": "d",
            "id_chapitre": "X"
        }))
        .unwrap();
        assert!(matches!(record.into_item(None), Err(SourceError::Decode(_))));
    }

    #[test]
    fn submit_body_uses_wire_names() {
        let body = SubmitAnswerBody::from(&AnswerSubmission {
            question_id: QuestionId::new(9),
            selected: AnswerOption::THIRD,
            elapsed_seconds: 14,
        });
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({ "qcm_id": 9, "reponse": 3, "temps_reponse": 14 })
        );
    }

    #[test]
    fn invalid_canonical_answer_is_dropped() {
        let response = SubmitAnswerResponse {
            correcte: false,
            bonne_reponse: Some(7),
        };
        assert_eq!(response.into_outcome().canonical_answer(), None);
    }
}
