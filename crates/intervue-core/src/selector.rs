//! Balanced random question selection.
//!
//! Each interview draws two questions per tier, shuffled independently, and
//! presents them easy, easy, medium, medium, hard, hard.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{Difficulty, Question};

/// Questions drawn from each tier.
pub const QUESTIONS_PER_TIER: usize = 2;

/// Questions in every interview.
pub const SELECTED_QUESTION_COUNT: usize = QUESTIONS_PER_TIER * Difficulty::ALL.len();

/// The questions chosen for one interview, in presentation order.
///
/// Only [`select_questions`] builds one, so the length and tier order always hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectedQuestions(Vec<Question>);

impl SelectedQuestions {
    pub fn as_slice(&self) -> &[Question] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.0.iter()
    }
}

/// Pick [`QUESTIONS_PER_TIER`] questions from each tier using `rng`.
///
/// Each tier is shuffled on its own (uniform permutation) and its first
/// questions taken. The concatenation is not shuffled again. Fails with
/// [`ValidationError::InsufficientTier`] rather than returning a short list.
pub fn select_questions<R: Rng + ?Sized>(
    questions: &[Question],
    rng: &mut R,
) -> Result<SelectedQuestions, ValidationError> {
    let mut selected = Vec::with_capacity(SELECTED_QUESTION_COUNT);

    for difficulty in Difficulty::ALL {
        let mut tier: Vec<&Question> = questions
            .iter()
            .filter(|q| q.difficulty == difficulty)
            .collect();

        if tier.len() < QUESTIONS_PER_TIER {
            return Err(ValidationError::InsufficientTier {
                difficulty,
                required: QUESTIONS_PER_TIER,
                found: tier.len(),
            });
        }

        tier.shuffle(rng);
        selected.extend(tier.into_iter().take(QUESTIONS_PER_TIER).cloned());
    }

    Ok(SelectedQuestions(selected))
}
