//! Store state shared by the memory and file backends.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use intervue_core::error::StoreError;
use intervue_core::model::{
    Answer, Candidate, CandidateId, CandidateStatus, QuestionBank, QuestionSet,
};
use intervue_core::session::Session;

use crate::codes::{generate_code, normalize_code, DASHBOARD_CODE_LEN, INTERVIEW_CODE_LEN};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    /// Keyed by interview code.
    #[serde(default)]
    question_sets: HashMap<String, QuestionSet>,
    /// Dashboard code to interview code.
    #[serde(default)]
    dashboard_codes: HashMap<String, String>,
    #[serde(default)]
    candidates: HashMap<CandidateId, Candidate>,
    #[serde(default)]
    sessions: HashMap<Uuid, Session>,
}

impl StoreState {
    fn code_taken(&self, code: &str) -> bool {
        self.question_sets.contains_key(code) || self.dashboard_codes.contains_key(code)
    }

    fn fresh_code(&self, len: usize) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let code = generate_code(&mut rng, len);
            if !self.code_taken(&code) {
                return code;
            }
        }
    }

    pub(crate) fn create_question_set(&mut self, bank: QuestionBank) -> QuestionSet {
        let interview_code = self.fresh_code(INTERVIEW_CODE_LEN);
        let dashboard_code = self.fresh_code(DASHBOARD_CODE_LEN);

        let set = QuestionSet {
            interview_code: interview_code.clone(),
            dashboard_code: dashboard_code.clone(),
            name: bank.name,
            questions: bank.questions,
            created_at: Utc::now(),
        };

        self.dashboard_codes
            .insert(dashboard_code, interview_code.clone());
        self.question_sets.insert(interview_code, set.clone());
        set
    }

    pub(crate) fn question_set_by_interview_code(
        &self,
        code: &str,
    ) -> Result<QuestionSet, StoreError> {
        let code = normalize_code(code);
        self.question_sets
            .get(&code)
            .cloned()
            .ok_or_else(|| StoreError::not_found("question set", code))
    }

    pub(crate) fn question_set_by_dashboard_code(
        &self,
        code: &str,
    ) -> Result<QuestionSet, StoreError> {
        let code = normalize_code(code);
        self.dashboard_codes
            .get(&code)
            .and_then(|interview_code| self.question_sets.get(interview_code))
            .cloned()
            .ok_or_else(|| StoreError::not_found("question set", code))
    }

    pub(crate) fn create_candidate(&mut self, mut candidate: Candidate) -> Result<Candidate, StoreError> {
        candidate.interview_code = normalize_code(&candidate.interview_code);
        if !self.question_sets.contains_key(&candidate.interview_code) {
            return Err(StoreError::not_found(
                "question set",
                candidate.interview_code,
            ));
        }
        if self.candidates.contains_key(&candidate.id) {
            return Err(StoreError::Conflict(format!(
                "candidate {} already exists",
                candidate.id
            )));
        }
        self.candidates.insert(candidate.id, candidate.clone());
        Ok(candidate)
    }

    pub(crate) fn candidate(&self, id: CandidateId) -> Result<Candidate, StoreError> {
        self.candidates
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("candidate", id.to_string()))
    }

    fn candidate_mut(&mut self, id: CandidateId) -> Result<&mut Candidate, StoreError> {
        self.candidates
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("candidate", id.to_string()))
    }

    pub(crate) fn append_answer(&mut self, id: CandidateId, answer: Answer) -> Result<(), StoreError> {
        let candidate = self.candidate_mut(id)?;
        if candidate.status != CandidateStatus::InProgress {
            return Err(StoreError::Conflict(format!(
                "candidate {id} is {}",
                candidate.status
            )));
        }
        if candidate.answer_for(&answer.question_id).is_some() {
            return Err(StoreError::Conflict(format!(
                "candidate {id} already answered question '{}'",
                answer.question_id
            )));
        }
        candidate.answers.push(answer);
        Ok(())
    }

    pub(crate) fn complete_candidate(&mut self, id: CandidateId, final_score: f64) -> Result<(), StoreError> {
        let candidate = self.candidate_mut(id)?;
        if candidate.status != CandidateStatus::InProgress || candidate.final_score.is_some() {
            return Err(StoreError::Conflict(format!(
                "candidate {id} is already {}",
                candidate.status
            )));
        }
        candidate.final_score = Some(final_score);
        candidate.status = CandidateStatus::Completed;
        Ok(())
    }

    pub(crate) fn update_status(&mut self, id: CandidateId, status: CandidateStatus) -> Result<(), StoreError> {
        let candidate = self.candidate_mut(id)?;
        if candidate.status == status {
            return Ok(());
        }
        if candidate.status != CandidateStatus::InProgress {
            return Err(StoreError::Conflict(format!(
                "candidate {id} is already {}",
                candidate.status
            )));
        }
        candidate.status = status;
        Ok(())
    }

    pub(crate) fn candidates_for(&self, interview_code: &str) -> Vec<Candidate> {
        let code = normalize_code(interview_code);
        let mut candidates: Vec<Candidate> = self
            .candidates
            .values()
            .filter(|c| c.interview_code == code)
            .cloned()
            .collect();
        candidates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        candidates
    }

    pub(crate) fn save_session(&mut self, session: &Session) {
        self.sessions.insert(session.id(), session.clone());
    }

    pub(crate) fn load_session(&self, id: Uuid) -> Result<Session, StoreError> {
        self.sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("session", id.to_string()))
    }

    pub(crate) fn delete_session(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.sessions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("session", id.to_string()))
    }
}
