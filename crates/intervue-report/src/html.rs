//! HTML dashboard generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use intervue_core::evaluator::feedback_band;
use intervue_core::model::{Answer, Candidate, CandidateStatus};
use intervue_core::report::DashboardReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn status_class(status: CandidateStatus) -> &'static str {
    match status {
        CandidateStatus::Completed => "completed",
        CandidateStatus::InProgress => "in-progress",
        CandidateStatus::Abandoned => "abandoned",
    }
}

/// Generate the dashboard page for a report.
pub fn generate_html(report: &DashboardReport) -> String {
    let mut html = String::new();
    let set = &report.question_set;

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>intervue dashboard: {}</title>\n",
        html_escape(&set.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&set.name)));
    html.push_str(&format!(
        "<p class=\"meta\">Interview code <strong>{}</strong> | {} questions | created {} | generated {}</p>\n",
        html_escape(&set.interview_code),
        set.question_count,
        set.created_at.format("%Y-%m-%d %H:%M UTC"),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    let stats = &report.stats;
    html.push_str("<section class=\"stats\">\n");
    for (label, value) in [
        ("Candidates", stats.total.to_string()),
        ("Completed", stats.completed.to_string()),
        ("In progress", stats.in_progress.to_string()),
        ("Abandoned", stats.abandoned.to_string()),
        ("Average score", format!("{:.1}", stats.average_score)),
    ] {
        html.push_str(&format!(
            "<div class=\"stat\"><span class=\"value\">{value}</span><span class=\"label\">{label}</span></div>\n"
        ));
    }
    html.push_str("</section>\n");

    let scored: Vec<&Candidate> = report
        .candidates
        .iter()
        .filter(|c| c.final_score.is_some())
        .collect();
    if !scored.is_empty() {
        html.push_str("<section>\n<h2>Final scores</h2>\n");
        html.push_str(&generate_score_chart(&scored));
        html.push_str("</section>\n");
    }

    html.push_str("<section>\n<h2>Candidates</h2>\n");
    if report.candidates.is_empty() {
        html.push_str("<p class=\"empty\">No candidates yet.</p>\n");
    } else {
        html.push_str("<table id=\"candidates\">\n");
        html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Name</th><th onclick=\"sortTable(1)\">Email</th><th onclick=\"sortTable(2)\">Phone</th><th onclick=\"sortTable(3)\">Status</th><th onclick=\"sortTable(4)\">Score</th><th onclick=\"sortTable(5)\">Started</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for c in &report.candidates {
            let score = c
                .final_score
                .map(|s| format!("{s:.1}"))
                .unwrap_or_else(|| "-".to_string());
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&c.name),
                html_escape(&c.email),
                html_escape(&c.phone),
                status_class(c.status),
                c.status,
                score,
                c.created_at.format("%Y-%m-%d %H:%M")
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    let answered: Vec<&Candidate> = report
        .candidates
        .iter()
        .filter(|c| !c.answers.is_empty())
        .collect();
    if !answered.is_empty() {
        html.push_str("<section class=\"answers\">\n<h2>Answers</h2>\n");
        for c in answered {
            html.push_str(&format!(
                "<details>\n<summary>{} ({} answers)</summary>\n",
                html_escape(&c.name),
                c.answers.len()
            ));
            for answer in &c.answers {
                html.push_str(&answer_block(report, answer));
            }
            html.push_str("</details>\n");
        }
        html.push_str("</section>\n");
    }

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

fn answer_block(report: &DashboardReport, answer: &Answer) -> String {
    let question = report.question(&answer.question_id);
    let prompt = question
        .map(|q| html_escape(&q.text))
        .unwrap_or_else(|| format!("Unknown question {}", html_escape(&answer.question_id)));

    let mut out = String::from("<div class=\"answer\">\n");
    out.push_str(&format!("<p class=\"prompt\">{prompt}</p>\n"));

    let text = if answer.raw_text.trim().is_empty() {
        "<em>(no answer)</em>".to_string()
    } else {
        html_escape(&answer.raw_text)
    };
    out.push_str(&format!("<blockquote>{text}</blockquote>\n"));

    let mut detail = format!("Score {:.1}", answer.score);
    if let Some(q) = question {
        detail.push_str(&format!(
            " of {:.0} | matched {} of {} keywords",
            q.max_score,
            answer.matched_keywords.len(),
            q.keywords.len()
        ));
        let label = feedback_band(answer.score, q.max_score).label();
        detail.push_str(&format!(" | <span class=\"band {label}\">{label}</span>"));
    }
    if !answer.matched_keywords.is_empty() {
        let matched: Vec<String> = answer
            .matched_keywords
            .iter()
            .map(|k| html_escape(k))
            .collect();
        detail.push_str(&format!(" | {}", matched.join(", ")));
    }
    out.push_str(&format!("<p class=\"detail\">{detail}</p>\n"));
    out.push_str("</div>\n");
    out
}

/// Write the dashboard page to a file.
pub fn write_html_report(report: &DashboardReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write dashboard to {}", path.display()))?;
    Ok(())
}

fn generate_score_chart(candidates: &[&Candidate]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 200;

    // a long answer can earn one point above the usual 10
    let ceiling = candidates
        .iter()
        .filter_map(|c| c.final_score)
        .fold(11.0_f64, f64::max);

    let total_height = candidates.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, c) in candidates.iter().enumerate() {
        let score = c.final_score.unwrap_or(0.0);
        let fraction = (score / ceiling).clamp(0.0, 1.0);
        let y = i * (bar_height + padding) + padding;
        let width = (fraction * max_width as f64) as usize;

        let color = if fraction >= 0.8 {
            "#22c55e"
        } else if fraction >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&c.name)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            score
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --muted: #6b7280; --border: #e5e7eb; --good: #dcfce7; --mid: #fef9c3; --bad: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --muted: #9ca3af; --border: #374151; --good: #064e3b; --mid: #713f12; --bad: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .empty, .detail { color: var(--muted); }
.stats { display: flex; gap: 1rem; flex-wrap: wrap; }
.stat { border: 1px solid var(--border); border-radius: 8px; padding: 1rem 1.5rem; min-width: 8rem; }
.stat .value { display: block; font-size: 1.75rem; font-weight: bold; }
.stat .label { color: var(--muted); }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.completed, .band.strong { background: var(--good); }
.in-progress, .band.fair { background: var(--mid); }
.abandoned, .band.weak { background: var(--bad); }
.band { padding: 0 0.4rem; border-radius: 4px; }
.answer { border-left: 3px solid var(--border); padding-left: 1rem; margin: 1rem 0; }
.prompt { font-weight: bold; }
blockquote { margin: 0.5rem 0; white-space: pre-wrap; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('candidates');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = !isNaN(na) && !isNaN(nb) ? na - nb : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
