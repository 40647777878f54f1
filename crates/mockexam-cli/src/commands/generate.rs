//! The `mockexam generate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use mockexam_core::generator::generate;
use mockexam_core::parser::load_question_pool;
use mockexam_core::random::session_seed;

pub fn execute(
    template: String,
    pool_path: PathBuf,
    seed: Option<String>,
    session: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let template = super::resolve_template(&template, &config)?;
    let pool = load_question_pool(&pool_path)?;

    let seed = match (seed, session) {
        (Some(seed), _) => Some(seed),
        (None, Some(session)) => Some(session_seed(&template.id, &session)),
        (None, None) => None,
    };

    let exam = generate(&template, &pool, seed.as_deref())
        .with_context(|| format!("cannot build exam from template '{}'", template.id))?;

    eprintln!(
        "{}: {} of {} questions from a pool of {} (seed {})",
        template.name,
        exam.len(),
        template.requested_questions(),
        pool.len(),
        exam.seed
    );
    for testlet in &template.testlets {
        eprintln!(
            "  {} {}: {} questions, {} min",
            testlet.id,
            testlet.name,
            exam.testlet_questions(&testlet.id).len(),
            testlet.time_limit_minutes
        );
    }
    for (area, count) in exam.count_by_area() {
        eprintln!("  {area}: {count}");
    }
    for warning in &exam.warnings {
        eprintln!("Warning: {warning}");
    }

    let json = serde_json::to_string_pretty(&exam).context("failed to serialize exam")?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write exam to {}", path.display()))?;
            eprintln!("Exam saved to: {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
