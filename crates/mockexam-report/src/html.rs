//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use mockexam_core::report::ExamReport;
use mockexam_core::scorer::{BlueprintPerformance, MasteryStatus, MissReason};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn status_class(status: MasteryStatus) -> &'static str {
    match status {
        MasteryStatus::Strong | MasteryStatus::Proficient => "pass",
        MasteryStatus::Developing => "warn",
        MasteryStatus::Weak => "fail",
    }
}

/// Generate an HTML report from a scored attempt.
pub fn generate_html(report: &ExamReport) -> String {
    let exam = &report.exam;
    let result = &report.result;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>mockexam report: {}</title>\n",
        html_escape(&exam.template_name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&exam.template_name)));
    html.push_str(&format!(
        "<p class=\"meta\">{} {} | {} questions | {} min | seed <code>{}</code> | {}</p>\n",
        html_escape(&exam.certification),
        html_escape(&exam.section),
        exam.question_count,
        exam.time_limit_minutes,
        html_escape(&exam.seed),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score summary
    let verdict_class = if result.passed { "pass" } else { "fail" };
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Score</h2>\n");
    html.push_str(&format!(
        "<p class=\"verdict {verdict_class}\">{:.1} / passing {:.1}: <strong>{}</strong></p>\n",
        result.scaled_score,
        result.passing_score,
        if result.passed { "PASS" } else { "FAIL" }
    ));
    html.push_str(&format!(
        "<p>{} of {} correct ({:.1}%), {} answered</p>\n",
        result.correct, result.total_questions, result.raw_percent, result.answered
    ));

    if !result.blueprint.is_empty() {
        html.push_str("<h2>Blueprint Areas</h2>\n");
        html.push_str(&generate_bar_chart(&result.blueprint));

        html.push_str("<table class=\"summary\" id=\"areas\">\n");
        html.push_str("<thead><tr><th onclick=\"sortTable('areas', 0)\">Area</th><th onclick=\"sortTable('areas', 1)\">Name</th><th onclick=\"sortTable('areas', 2)\">Weight</th><th onclick=\"sortTable('areas', 3)\">Correct</th><th onclick=\"sortTable('areas', 4)\">Accuracy</th><th onclick=\"sortTable('areas', 5)\">Status</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for p in &result.blueprint {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{:.0}%</td><td>{}/{}</td><td>{:.1}%</td><td class=\"{}\">{}</td></tr>\n",
                html_escape(&p.area),
                html_escape(&p.name),
                p.weight,
                p.correct,
                p.questions,
                p.accuracy,
                status_class(p.status),
                p.status
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    // Difficulty
    if !result.difficulty.is_empty() {
        html.push_str("<section class=\"difficulty\">\n");
        html.push_str("<h2>Difficulty</h2>\n");
        html.push_str("<table>\n");
        html.push_str("<thead><tr><th>Tier</th><th>Correct</th><th>Answered</th><th>Accuracy</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for d in &result.difficulty {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}/{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
                d.difficulty, d.correct, d.questions, d.attempted, d.accuracy
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    // Recommendations
    if !result.recommendations.is_empty() {
        html.push_str("<section class=\"recommendations\">\n");
        html.push_str("<h2>Study Recommendations</h2>\n<ol>\n");
        for rec in &result.recommendations {
            html.push_str(&format!(
                "<li class=\"{}\">{}</li>\n",
                status_class(rec.status),
                html_escape(&rec.message)
            ));
        }
        html.push_str("</ol>\n</section>\n");
    }

    // Review
    if !result.review.is_empty() {
        html.push_str("<section class=\"review\">\n");
        html.push_str(&format!("<h2>Review ({})</h2>\n", result.review.len()));
        html.push_str("<table id=\"review\">\n");
        html.push_str("<thead><tr><th onclick=\"sortTable('review', 0)\">#</th><th onclick=\"sortTable('review', 1)\">Question</th><th onclick=\"sortTable('review', 2)\">Area</th><th onclick=\"sortTable('review', 3)\">Difficulty</th><th onclick=\"sortTable('review', 4)\">Reason</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for q in &result.review {
            let reason = match q.reason {
                MissReason::Unanswered => "unanswered".to_string(),
                MissReason::Incorrect { selected, correct } => {
                    format!("chose {selected}, correct {correct}")
                }
            };
            html.push_str(&format!(
                "<tr class=\"fail\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                q.position,
                html_escape(&q.id),
                html_escape(&q.blueprint_area),
                q.difficulty,
                reason
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    if !exam.warnings.is_empty() {
        html.push_str("<section class=\"warnings\">\n");
        html.push_str("<h2>Generation Warnings</h2>\n<ul>\n");
        for w in &exam.warnings {
            html.push_str(&format!("<li>{}</li>\n", html_escape(w)));
        }
        html.push_str("</ul>\n</section>\n");
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ExamReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn generate_bar_chart(areas: &[BlueprintPerformance]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 120;

    let total_height = areas.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, area) in areas.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (area.accuracy.clamp(0.0, 100.0) / 100.0 * max_width as f64) as usize;

        let color = match area.status {
            MasteryStatus::Strong | MasteryStatus::Proficient => "#22c55e",
            MasteryStatus::Developing => "#eab308",
            MasteryStatus::Weak => "#ef4444",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&area.area)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            area.accuracy
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --warn: #fef9c3; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --warn: #713f12; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.verdict { font-size: 1.5rem; padding: 0.75rem 1rem; border-radius: 8px; display: inline-block; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.warn { background: var(--warn); }
.fail { background: var(--fail); }
li { margin: 0.25rem 0; padding: 0.25rem 0.5rem; border-radius: 4px; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(id, col) {
  const table = document.getElementById(id);
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, { numeric: true }) : vb.localeCompare(va, undefined, { numeric: true });
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
