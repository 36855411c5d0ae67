//! The `intervue create` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use intervue_core::parser;
use intervue_store::config::{create_store, load_config_from, StoreKind};

pub async fn execute(question_set_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let bank = parser::parse_question_bank(&question_set_path)?;
    parser::check_question_bank(&bank)
        .with_context(|| format!("cannot publish {}", question_set_path.display()))?;

    for w in parser::lint_question_bank(&bank) {
        let id = w.question_id.as_deref().unwrap_or("-");
        eprintln!("  [{id}] WARNING: {}", w.message);
    }

    let config = load_config_from(config_path.as_deref())?;
    let store = create_store(&config).await?;
    let set = store.create_question_set(bank).await?;

    tracing::info!(
        interview_code = %set.interview_code,
        questions = set.questions.len(),
        "question set published"
    );

    println!("Question set: {} ({} questions)", set.name, set.questions.len());
    println!("Interview code: {}", set.interview_code);
    println!("Dashboard code: {}", set.dashboard_code);

    if config.store == StoreKind::Memory {
        eprintln!("Note: the memory store does not persist; these codes expire when this process exits.");
    }

    Ok(())
}
