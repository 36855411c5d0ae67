//! Persistence seam between the interview engine and its storage.
//!
//! Implemented by `MemoryStore` and `FileStore` in the `intervue-store` crate.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Answer, Candidate, CandidateId, CandidateStatus, QuestionBank, QuestionSet};
use crate::session::Session;

/// Storage for question sets, candidates and in-flight sessions.
///
/// Code lookups are case-insensitive. Implementations must make answer
/// appends and completion idempotent-safe: a second answer for the same
/// question or a second completion is a [`StoreError::Conflict`].
#[async_trait]
pub trait InterviewStore: Send + Sync {
    /// Human-readable backend name (e.g. "memory").
    fn name(&self) -> &str;

    /// Publish a bank, assigning fresh interview and dashboard codes.
    async fn create_question_set(&self, bank: QuestionBank) -> Result<QuestionSet, StoreError>;

    async fn question_set_by_interview_code(&self, code: &str) -> Result<QuestionSet, StoreError>;

    async fn question_set_by_dashboard_code(&self, code: &str) -> Result<QuestionSet, StoreError>;

    async fn create_candidate(&self, candidate: Candidate) -> Result<Candidate, StoreError>;

    async fn candidate(&self, id: CandidateId) -> Result<Candidate, StoreError>;

    async fn append_answer(&self, id: CandidateId, answer: Answer) -> Result<(), StoreError>;

    /// Record the final score and mark the candidate completed.
    async fn complete_candidate(&self, id: CandidateId, final_score: f64) -> Result<(), StoreError>;

    async fn update_status(&self, id: CandidateId, status: CandidateStatus) -> Result<(), StoreError>;

    /// All candidates for an interview code, newest first.
    async fn candidates_for(&self, interview_code: &str) -> Result<Vec<Candidate>, StoreError>;

    async fn save_session(&self, session: &Session) -> Result<(), StoreError>;

    async fn load_session(&self, id: Uuid) -> Result<Session, StoreError>;

    async fn delete_session(&self, id: Uuid) -> Result<(), StoreError>;
}
