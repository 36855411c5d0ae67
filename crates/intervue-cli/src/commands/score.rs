//! The `intervue score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use intervue_core::evaluator::{evaluate, LENGTH_BONUS};

/// Split a `;`-separated keyword list, dropping blanks.
fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

pub fn execute(
    keywords: String,
    max_score: f64,
    answer: Option<String>,
    answer_file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let answer = match (answer, answer_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read answer: {}", path.display()))?,
        (None, None) => anyhow::bail!("provide --answer or --answer-file"),
    };

    let keywords = parse_keywords(&keywords);
    let evaluation = evaluate(&answer, &keywords, max_score)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
        return Ok(());
    }

    println!(
        "Score: {} / {} (up to {} with the length bonus)",
        evaluation.score,
        max_score,
        max_score + LENGTH_BONUS
    );
    println!(
        "Matched {} of {} keywords: {}",
        evaluation.matched_keywords.len(),
        keywords.len(),
        if evaluation.matched_keywords.is_empty() {
            "-".to_string()
        } else {
            evaluation.matched_keywords.join(", ")
        }
    );
    println!("Words: {}", evaluation.word_count);
    println!("Band: {}", evaluation.band(max_score));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_split_and_trimmed() {
        assert_eq!(
            parse_keywords(" ownership ; borrow checker;;  "),
            vec!["ownership".to_string(), "borrow checker".to_string()]
        );
        assert!(parse_keywords(" ; ").is_empty());
    }
}
