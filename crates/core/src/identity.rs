//! Student identity as an injected capability.

use crate::model::StudentId;

/// Who is answering, and the credential to present to the remote API.
pub trait StudentIdentity: Send + Sync {
    fn current_student_id(&self) -> Option<StudentId>;

    fn access_token(&self) -> Option<String>;
}

/// Identity fixed at construction, e.g. from configuration or in tests.
#[derive(Clone, Default)]
pub struct StaticIdentity {
    student_id: Option<StudentId>,
    token: Option<String>,
}

impl StaticIdentity {
    #[must_use]
    pub fn new(student_id: Option<StudentId>, token: Option<String>) -> Self {
        Self {
            student_id,
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl StudentIdentity for StaticIdentity {
    fn current_student_id(&self) -> Option<StudentId> {
        self.student_id
    }

    fn access_token(&self) -> Option<String> {
        self.token.clone()
    }
}

impl std::fmt::Debug for StaticIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticIdentity")
            .field("student_id", &self.student_id)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}
