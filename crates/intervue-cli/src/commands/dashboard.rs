//! The `intervue dashboard` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use intervue_core::report::DashboardReport;
use intervue_store::config::{create_store, load_config_from};

pub async fn execute(
    code: String,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = create_store(&config).await?;

    let question_set = store.question_set_by_dashboard_code(&code).await?;
    let candidates = store.candidates_for(&question_set.interview_code).await?;
    let report = DashboardReport::build(&question_set, candidates);

    match format.as_str() {
        "text" => print_text(&report),
        "json" => match output {
            Some(path) => {
                report.save_json(&path)?;
                println!("Report saved to: {}", path.display());
            }
            None => println!("{}", serde_json::to_string_pretty(&report)?),
        },
        "html" => {
            let path = output.unwrap_or_else(|| {
                PathBuf::from(format!("dashboard-{}.html", report.question_set.interview_code))
            });
            intervue_report::write_html_report(&report, &path)?;
            println!("HTML report saved to: {}", path.display());
        }
        other => anyhow::bail!("unknown format: {other} (expected text, json or html)"),
    }

    Ok(())
}

fn print_text(report: &DashboardReport) {
    let set = &report.question_set;
    println!(
        "{} (interview code {}, {} questions)",
        set.name, set.interview_code, set.question_count
    );

    let stats = &report.stats;
    println!(
        "Candidates: {} total, {} completed, {} in progress, {} abandoned",
        stats.total, stats.completed, stats.in_progress, stats.abandoned
    );
    println!("Average score: {:.1}", stats.average_score);

    if report.candidates.is_empty() {
        println!("\nNo candidates yet.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Email", "Phone", "Status", "Answers", "Score", "Started"]);
    for candidate in &report.candidates {
        table.add_row(vec![
            Cell::new(&candidate.name),
            Cell::new(&candidate.email),
            Cell::new(&candidate.phone),
            Cell::new(candidate.status),
            Cell::new(candidate.answers.len()),
            Cell::new(
                candidate
                    .final_score
                    .map(|s| format!("{s:.1}"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(candidate.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    println!("\n{table}");
}
