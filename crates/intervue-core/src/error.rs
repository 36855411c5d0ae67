//! Error types for scoring, selection, sessions and storage.
//!
//! `StoreError` lives here rather than in `intervue-store` so the session
//! engine can classify persistence failures without string matching.

use thiserror::Error;

use crate::model::Difficulty;
use crate::session::Stage;

/// Malformed input. Never mutates session state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("name is required")]
    EmptyName,

    #[error("email is required")]
    EmptyEmail,

    #[error("phone is required")]
    EmptyPhone,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// A question with no keywords cannot be scored.
    #[error("question '{question_id}' has no keywords")]
    EmptyKeywords { question_id: String },

    #[error("question '{question_id}' has an invalid max score {max_score}")]
    InvalidMaxScore { question_id: String, max_score: f64 },

    #[error("question '{question_id}' has no text")]
    EmptyQuestionText { question_id: String },

    #[error("duplicate question id: {0}")]
    DuplicateQuestionId(String),

    /// Fewer questions in a tier than the selector draws from it.
    #[error("need at least {required} {difficulty} questions, found {found}")]
    InsufficientTier {
        difficulty: Difficulty,
        required: usize,
        found: usize,
    },
}

/// Failures reported by an `InterviewStore` implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            key: key.into(),
        }
    }
}

/// Errors surfaced by the session state machine and engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterviewError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A second submission for a question index that already has an answer.
    #[error("question {question_index} has already been answered")]
    ConcurrencyViolation { question_index: usize },

    #[error("cannot {action} while in the {stage} stage")]
    InvalidTransition { stage: Stage, action: &'static str },

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for InterviewError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, key } => InterviewError::NotFound { entity, key },
            other => InterviewError::Store(other),
        }
    }
}

impl InterviewError {
    /// Returns `true` for triggers that lost a race or arrived in the wrong
    /// stage. The driver drops these without failing the session.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            InterviewError::ConcurrencyViolation { .. } | InterviewError::InvalidTransition { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_interview_not_found() {
        let err: InterviewError = StoreError::not_found("question set", "ABC123").into();
        assert_eq!(
            err,
            InterviewError::NotFound {
                entity: "question set",
                key: "ABC123".into()
            }
        );
        assert_eq!(err.to_string(), "question set not found: ABC123");
    }

    #[test]
    fn insufficient_tier_message() {
        let err = ValidationError::InsufficientTier {
            difficulty: Difficulty::Hard,
            required: 2,
            found: 1,
        };
        assert_eq!(err.to_string(), "need at least 2 hard questions, found 1");
    }

    #[test]
    fn races_and_stage_mismatches_are_benign() {
        assert!(InterviewError::ConcurrencyViolation { question_index: 2 }.is_benign());
        assert!(InterviewError::InvalidTransition {
            stage: Stage::Complete,
            action: "submit",
        }
        .is_benign());
        assert!(!InterviewError::Validation(ValidationError::EmptyName).is_benign());
        assert!(!InterviewError::Store(StoreError::Io("disk".into())).is_benign());
    }
}
