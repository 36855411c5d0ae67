//! Interviewer dashboard report with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Candidate, Question, QuestionSet};
use crate::statistics::{compute_dashboard_stats, DashboardStats};

/// Everything an interviewer sees for one question set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    pub question_set: QuestionSetSummary,
    /// Every question in the set, for resolving answer details.
    pub questions: Vec<Question>,
    pub stats: DashboardStats,
    /// Newest first.
    pub candidates: Vec<Candidate>,
}

/// Summary of a question set (without the questions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSetSummary {
    pub name: String,
    pub interview_code: String,
    pub dashboard_code: String,
    pub question_count: usize,
    pub created_at: DateTime<Utc>,
}

impl DashboardReport {
    /// Build a report for `question_set` from its candidates.
    pub fn build(question_set: &QuestionSet, mut candidates: Vec<Candidate>) -> Self {
        candidates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let stats = compute_dashboard_stats(&candidates);

        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            question_set: QuestionSetSummary {
                name: question_set.name.clone(),
                interview_code: question_set.interview_code.clone(),
                dashboard_code: question_set.dashboard_code.clone(),
                question_count: question_set.questions.len(),
                created_at: question_set.created_at,
            },
            questions: question_set.questions.clone(),
            stats,
            candidates,
        }
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: DashboardReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
