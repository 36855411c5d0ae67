//! Core data model types for intervue.
//!
//! Questions, published question sets, candidates and their answers. Every
//! type here is plain data; behavior lives in the evaluator, selector and
//! session modules.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Difficulty tier, used for both selection balance and score weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Tiers in presentation order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Weight applied by the final score aggregation.
    pub const fn weight(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A single interview question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within its question set.
    pub id: String,
    pub difficulty: Difficulty,
    /// The prompt shown to the candidate.
    pub text: String,
    /// Keywords looked for in the answer, in authoring order.
    pub keywords: Vec<String>,
    /// Nominal maximum score. A long answer may earn one point above it.
    #[serde(default = "default_max_score")]
    pub max_score: f64,
}

/// Max score used when a question does not specify one.
pub const DEFAULT_MAX_SCORE: f64 = 10.0;

fn default_max_score() -> f64 {
    DEFAULT_MAX_SCORE
}

/// An authored list of questions that has not been published yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    pub name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuestionBank {
    /// Number of questions in the given tier.
    pub fn tier_count(&self, difficulty: Difficulty) -> usize {
        self.questions
            .iter()
            .filter(|q| q.difficulty == difficulty)
            .count()
    }
}

/// A published question set, addressable by its two access codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Candidate-facing code.
    pub interview_code: String,
    /// Interviewer-facing code for viewing results.
    pub dashboard_code: String,
    pub name: String,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}

/// What caused an answer to be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitTrigger {
    /// The candidate submitted explicitly.
    Manual,
    /// The countdown reached zero and the draft was submitted as-is.
    Timeout,
}

/// A scored answer. Created once per question per candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub raw_text: String,
    /// Subset of the question's keywords, as authored.
    pub matched_keywords: Vec<String>,
    pub score: f64,
    pub trigger: SubmitTrigger,
    pub submitted_at: DateTime<Utc>,
}

/// Candidate identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub Uuid);

impl CandidateId {
    pub fn new() -> Self {
        CandidateId(Uuid::new_v4())
    }
}

impl Default for CandidateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CandidateId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(CandidateId)
    }
}

/// Contact details captured in the resume stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

impl CandidateInfo {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Check the required fields and return a trimmed copy.
    pub fn validate(&self) -> Result<CandidateInfo, ValidationError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();

        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if email.is_empty() {
            return Err(ValidationError::EmptyEmail);
        }
        if phone.is_empty() {
            return Err(ValidationError::EmptyPhone);
        }
        if !email_pattern().is_match(email) {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }

        Ok(CandidateInfo::new(name, email, phone))
    }
}

/// Lifecycle of a candidate's interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl CandidateStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CandidateStatus::InProgress => "in_progress",
            CandidateStatus::Completed => "completed",
            CandidateStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A candidate taking one interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub interview_code: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: CandidateStatus,
    /// Set exactly once, when the interview completes.
    #[serde(default)]
    pub final_score: Option<f64>,
    #[serde(default)]
    pub answers: Vec<Answer>,
    pub created_at: DateTime<Utc>,
}

impl Candidate {
    pub fn new(interview_code: impl Into<String>, info: CandidateInfo) -> Self {
        Self {
            id: CandidateId::new(),
            interview_code: interview_code.into(),
            name: info.name,
            email: info.email,
            phone: info.phone,
            status: CandidateStatus::InProgress,
            final_score: None,
            answers: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }
}
