//! In-memory store.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use intervue_core::error::StoreError;
use intervue_core::model::{
    Answer, Candidate, CandidateId, CandidateStatus, QuestionBank, QuestionSet,
};
use intervue_core::session::Session;
use intervue_core::traits::InterviewStore;

use crate::state::StoreState;

/// A store that keeps everything in process memory.
///
/// Suitable for tests and single-process use; nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    /// Number of mutating calls made.
    write_count: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of mutating calls made to this store.
    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::Relaxed)
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> MutexGuard<'_, StoreState> {
        self.write_count.fetch_add(1, Ordering::Relaxed);
        self.state()
    }
}

#[async_trait]
impl InterviewStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create_question_set(&self, bank: QuestionBank) -> Result<QuestionSet, StoreError> {
        let set = self.write().create_question_set(bank);
        tracing::debug!(interview_code = %set.interview_code, "question set created");
        Ok(set)
    }

    async fn question_set_by_interview_code(&self, code: &str) -> Result<QuestionSet, StoreError> {
        self.state().question_set_by_interview_code(code)
    }

    async fn question_set_by_dashboard_code(&self, code: &str) -> Result<QuestionSet, StoreError> {
        self.state().question_set_by_dashboard_code(code)
    }

    async fn create_candidate(&self, candidate: Candidate) -> Result<Candidate, StoreError> {
        self.write().create_candidate(candidate)
    }

    async fn candidate(&self, id: CandidateId) -> Result<Candidate, StoreError> {
        self.state().candidate(id)
    }

    async fn append_answer(&self, id: CandidateId, answer: Answer) -> Result<(), StoreError> {
        self.write().append_answer(id, answer)
    }

    async fn complete_candidate(&self, id: CandidateId, final_score: f64) -> Result<(), StoreError> {
        self.write().complete_candidate(id, final_score)
    }

    async fn update_status(&self, id: CandidateId, status: CandidateStatus) -> Result<(), StoreError> {
        self.write().update_status(id, status)
    }

    async fn candidates_for(&self, interview_code: &str) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.state().candidates_for(interview_code))
    }

    async fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        self.write().save_session(session);
        Ok(())
    }

    async fn load_session(&self, id: Uuid) -> Result<Session, StoreError> {
        self.state().load_session(id)
    }

    async fn delete_session(&self, id: Uuid) -> Result<(), StoreError> {
        self.write().delete_session(id)
    }
}
