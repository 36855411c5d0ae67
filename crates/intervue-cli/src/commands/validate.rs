//! The `intervue validate` command.

use std::path::PathBuf;

use anyhow::Result;

use intervue_core::model::Difficulty;
use intervue_core::parser;

pub fn execute(question_set_path: PathBuf) -> Result<()> {
    let banks = if question_set_path.is_dir() {
        parser::load_question_directory(&question_set_path)?
    } else {
        vec![parser::parse_question_bank(&question_set_path)?]
    };

    let mut total_warnings = 0;
    let mut invalid = 0;

    for bank in &banks {
        let tiers: Vec<String> = Difficulty::ALL
            .iter()
            .map(|&d| format!("{} {d}", bank.tier_count(d)))
            .collect();
        println!(
            "Question set: {} ({} questions: {})",
            bank.name,
            bank.questions.len(),
            tiers.join(", ")
        );

        if let Err(e) = parser::check_question_bank(bank) {
            println!("  ERROR: {e}");
            invalid += 1;
        }

        let warnings = parser::lint_question_bank(bank);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if invalid > 0 {
        anyhow::bail!("{invalid} question set(s) cannot be published");
    }

    if total_warnings == 0 {
        println!("All question sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
