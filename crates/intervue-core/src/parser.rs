//! Question bank loading.
//!
//! Banks are authored as TOML files or imported from CSV spreadsheets, then
//! checked before they can be published as a question set.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::model::{Difficulty, Question, QuestionBank, DEFAULT_MAX_SCORE};
use crate::selector::QUESTIONS_PER_TIER;
use crate::text::normalize;

/// Intermediate TOML structure for question bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    question_set: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    difficulty: String,
    text: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default = "default_max_score")]
    max_score: f64,
}

fn default_max_score() -> f64 {
    DEFAULT_MAX_SCORE
}

/// One CSV row. Every column is optional so bad rows can be skipped
/// individually instead of failing the whole file.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    keywords: Option<String>,
    #[serde(default, rename = "maxScore", alias = "max_score")]
    max_score: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

/// Parse a question bank file, choosing the format by extension.
pub fn parse_question_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "csv") {
        parse_question_bank_csv_str(&content, path)
    } else {
        parse_question_bank_str(&content, path)
    }
}

/// Parse a TOML string into a `QuestionBank`.
pub fn parse_question_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let difficulty: Difficulty = q
                .difficulty
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question '{}': {}", q.id, e))?;
            Ok(Question {
                id: q.id,
                difficulty,
                text: q.text,
                keywords: q.keywords,
                max_score: q.max_score,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionBank {
        name: parsed.question_set.name,
        questions,
    })
}

/// Parse CSV with columns `difficulty,question,keywords[,maxScore][,id]`.
///
/// Keywords are separated by `;`. A blank difficulty means easy and a blank
/// or unparsable max score means 10. Rows without question text or keywords
/// are skipped. The bank is named after the file stem.
pub fn parse_question_bank_csv_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut questions = Vec::new();
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        // header is line 1
        let line = index + 2;
        let row = row.with_context(|| {
            format!("failed to parse CSV row {line}: {}", source_path.display())
        })?;

        let text = row.question.unwrap_or_default();
        let keywords: Vec<String> = row
            .keywords
            .unwrap_or_default()
            .split(';')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect();

        if text.is_empty() || keywords.is_empty() {
            tracing::warn!(
                "skipping row {line} of {}: missing question text or keywords",
                source_path.display()
            );
            continue;
        }

        let difficulty = match row.difficulty.as_deref().filter(|d| !d.is_empty()) {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| anyhow::anyhow!("row {line}: {e}"))?,
            None => Difficulty::Easy,
        };

        let max_score = row
            .max_score
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(DEFAULT_MAX_SCORE);

        let id = row
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        questions.push(Question {
            id,
            difficulty,
            text,
            keywords,
            max_score,
        });
    }

    let name = source_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "imported".to_string());

    Ok(QuestionBank { name, questions })
}

/// Recursively load all `.toml` and `.csv` question banks from a directory.
pub fn load_question_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_question_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "csv")
        {
            match parse_question_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// Check that a bank can be published: every question has text, keywords
/// and a positive max score, ids are unique, and every tier has enough
/// questions for selection. Returns the first problem found.
pub fn check_question_bank(bank: &QuestionBank) -> Result<(), ValidationError> {
    let mut seen_ids = HashSet::new();

    for question in &bank.questions {
        if !seen_ids.insert(question.id.as_str()) {
            return Err(ValidationError::DuplicateQuestionId(question.id.clone()));
        }
        if question.text.trim().is_empty() {
            return Err(ValidationError::EmptyQuestionText {
                question_id: question.id.clone(),
            });
        }
        if question.keywords.is_empty() {
            return Err(ValidationError::EmptyKeywords {
                question_id: question.id.clone(),
            });
        }
        if !question.max_score.is_finite() || question.max_score <= 0.0 {
            return Err(ValidationError::InvalidMaxScore {
                question_id: question.id.clone(),
                max_score: question.max_score,
            });
        }
    }

    for difficulty in Difficulty::ALL {
        let found = bank.tier_count(difficulty);
        if found < QUESTIONS_PER_TIER {
            return Err(ValidationError::InsufficientTier {
                difficulty,
                required: QUESTIONS_PER_TIER,
                found,
            });
        }
    }

    Ok(())
}

/// A non-fatal issue found in a question bank.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    pub message: String,
}

/// Look for authoring mistakes that do not block publishing.
pub fn lint_question_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for question in &bank.questions {
        let mut seen = HashSet::new();
        for keyword in &question.keywords {
            let normalized = normalize(keyword);
            if normalized.is_empty() {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!("keyword '{keyword}' has no ASCII letters or digits and matches every answer"),
                });
            } else if !seen.insert(normalized) {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!("duplicate keyword '{keyword}'"),
                });
            }
        }
    }

    let mut seen_text = HashSet::new();
    for question in &bank.questions {
        let normalized = normalize(&question.text);
        if !normalized.is_empty() && !seen_text.insert(normalized) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "question text repeats an earlier question".into(),
            });
        }
    }

    warnings
}
