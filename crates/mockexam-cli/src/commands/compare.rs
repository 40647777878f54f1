//! The `mockexam compare` command.

use std::path::PathBuf;

use anyhow::Result;

use mockexam_core::report::ExamReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    let baseline = ExamReport::load_json(&baseline_path)?;
    let current = ExamReport::load_json(&current_path)?;

    if baseline.exam.template_id != current.exam.template_id {
        tracing::warn!(
            baseline = %baseline.exam.template_id,
            current = %current.exam.template_id,
            "comparing attempts from different templates"
        );
    }

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Score: {:.1} -> {:.1} ({:+.1})",
                report.baseline_score, report.current_score, report.score_delta
            );
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );

            if !report.regressions.is_empty() {
                println!("\nRegressions:");
                for r in &report.regressions {
                    println!(
                        "  {} ({}) {:.1}% -> {:.1}% ({:+.1}%)",
                        r.area, r.name, r.baseline_accuracy, r.current_accuracy, r.delta
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {} ({}) {:.1}% -> {:.1}% ({:+.1}%)",
                        i.area, i.name, i.baseline_accuracy, i.current_accuracy, i.delta
                    );
                }
            }

            if !report.new_areas.is_empty() {
                println!("\n{} new area(s): {}", report.new_areas.len(), report.new_areas.join(", "));
            }
            if !report.removed_areas.is_empty() {
                println!(
                    "{} removed area(s): {}",
                    report.removed_areas.len(),
                    report.removed_areas.join(", ")
                );
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
