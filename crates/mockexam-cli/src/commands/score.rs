//! The `mockexam score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use mockexam_core::model::GeneratedExam;
use mockexam_core::parser::load_answers;
use mockexam_core::report::ExamReport;
use mockexam_core::scorer::{ExamResult, ExamScorer};
use mockexam_report::write_html_report;

pub fn execute(
    exam_path: PathBuf,
    answers_path: PathBuf,
    passing_score: Option<f64>,
    format: String,
    save: Option<Option<PathBuf>>,
    html: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = super::load_config(config_path)?;

    let content = std::fs::read_to_string(&exam_path)
        .with_context(|| format!("failed to read exam: {}", exam_path.display()))?;
    let exam: GeneratedExam = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse exam: {}", exam_path.display()))?;
    let answers = load_answers(&answers_path)?;

    let passing = passing_score.unwrap_or(exam.template.passing_score);
    let result = ExamScorer::new(config.scoring_options()).score(&exam, &answers, passing);
    let report = ExamReport::new(&exam, result);

    match format.as_str() {
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&report.result)?),
        _ => print_text(&report.result),
    }

    if let Some(target) = save {
        let path = target.unwrap_or_else(|| {
            let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
            config
                .output_dir
                .join(format!("{}-{timestamp}.json", report.exam.template_id))
        });
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    if let Some(path) = html {
        write_html_report(&report, &path)?;
        eprintln!("HTML report: {}", path.display());
    }

    Ok(())
}

fn print_text(result: &ExamResult) {
    println!(
        "Score: {:.1} (passing {:.1}) {}",
        result.scaled_score,
        result.passing_score,
        if result.passed { "PASS" } else { "FAIL" }
    );
    println!(
        "Correct: {}/{} ({:.1}%), answered {}",
        result.correct, result.total_questions, result.raw_percent, result.answered
    );

    if !result.blueprint.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Area", "Name", "Weight", "Correct", "Accuracy", "Status"]);
        for p in &result.blueprint {
            table.add_row(vec![
                Cell::new(&p.area),
                Cell::new(&p.name),
                Cell::new(format!("{:.0}%", p.weight)),
                Cell::new(format!("{}/{}", p.correct, p.questions)),
                Cell::new(format!("{:.1}%", p.accuracy)),
                Cell::new(p.status),
            ]);
        }
        println!("\n{table}");
    }

    if !result.difficulty.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Difficulty", "Correct", "Accuracy"]);
        for d in &result.difficulty {
            table.add_row(vec![
                Cell::new(d.difficulty),
                Cell::new(format!("{}/{}", d.correct, d.questions)),
                Cell::new(format!("{:.1}%", d.accuracy)),
            ]);
        }
        println!("\n{table}");
    }

    if !result.recommendations.is_empty() {
        println!("\nStudy recommendations:");
        for (i, rec) in result.recommendations.iter().enumerate() {
            println!("  {}. {}", i + 1, rec.message);
        }
    }

    if !result.review.is_empty() {
        println!("\n{} question(s) to review", result.review.len());
    }
}
