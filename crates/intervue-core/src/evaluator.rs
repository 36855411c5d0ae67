//! Keyword-based answer scoring.
//!
//! An answer earns `matched / total * max_score` points, plus one bonus point
//! when it runs longer than [`LENGTH_BONUS_WORDS`] words. The total is capped at
//! `max_score + 1` and rounded to one decimal place, half away from zero.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::Question;
use crate::text::{count_words, normalize};

/// Answers with more words than this earn the length bonus.
pub const LENGTH_BONUS_WORDS: usize = 20;

/// Points awarded for a long answer.
pub const LENGTH_BONUS: f64 = 1.0;

/// Result of scoring a single answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Matched keywords in authoring order, as authored.
    pub matched_keywords: Vec<String>,
    pub score: f64,
    /// Fraction of keywords found, in `0.0..=1.0`.
    pub keyword_ratio: f64,
    /// Words in the raw, unnormalized answer.
    pub word_count: usize,
}

/// Coarse grade shown after each answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackBand {
    Strong,
    Fair,
    Weak,
}

impl FeedbackBand {
    pub const fn label(self) -> &'static str {
        match self {
            FeedbackBand::Strong => "strong",
            FeedbackBand::Fair => "fair",
            FeedbackBand::Weak => "weak",
        }
    }
}

impl fmt::Display for FeedbackBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Grade `score` relative to the best reachable score (`max_score + 1`).
pub fn feedback_band(score: f64, max_score: f64) -> FeedbackBand {
    let ceiling = max_score + LENGTH_BONUS;
    let fraction = if ceiling > 0.0 { score / ceiling } else { 0.0 };
    if fraction >= 0.8 {
        FeedbackBand::Strong
    } else if fraction >= 0.5 {
        FeedbackBand::Fair
    } else {
        FeedbackBand::Weak
    }
}

impl Evaluation {
    pub fn band(&self, max_score: f64) -> FeedbackBand {
        feedback_band(self.score, max_score)
    }
}

/// Round to one decimal place, half away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Score `answer` against `keywords`.
///
/// Matching is substring containment on normalized text, so a keyword that
/// appears inside a longer word still counts. Fails on an empty keyword list
/// or a max score that is not a positive finite number.
pub fn evaluate(
    answer: &str,
    keywords: &[String],
    max_score: f64,
) -> Result<Evaluation, ValidationError> {
    if keywords.is_empty() {
        return Err(ValidationError::EmptyKeywords {
            question_id: String::new(),
        });
    }
    if !max_score.is_finite() || max_score <= 0.0 {
        return Err(ValidationError::InvalidMaxScore {
            question_id: String::new(),
            max_score,
        });
    }

    let normalized_answer = normalize(answer);
    let matched_keywords: Vec<String> = keywords
        .iter()
        .filter(|keyword| normalized_answer.contains(&normalize(keyword)))
        .cloned()
        .collect();

    let keyword_ratio = matched_keywords.len() as f64 / keywords.len() as f64;
    let word_count = count_words(answer);
    let bonus = if word_count > LENGTH_BONUS_WORDS {
        LENGTH_BONUS
    } else {
        0.0
    };

    let capped = (keyword_ratio * max_score + bonus).min(max_score + LENGTH_BONUS);

    Ok(Evaluation {
        matched_keywords,
        score: round_to_tenth(capped),
        keyword_ratio,
        word_count,
    })
}

/// Score an answer to `question`, attributing validation errors to it.
pub fn evaluate_question(answer: &str, question: &Question) -> Result<Evaluation, ValidationError> {
    evaluate(answer, &question.keywords, question.max_score).map_err(|err| match err {
        ValidationError::EmptyKeywords { .. } => ValidationError::EmptyKeywords {
            question_id: question.id.clone(),
        },
        ValidationError::InvalidMaxScore { max_score, .. } => ValidationError::InvalidMaxScore {
            question_id: question.id.clone(),
            max_score,
        },
        other => other,
    })
}
