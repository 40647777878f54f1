//! The `mockexam validate` command.

use std::path::PathBuf;

use anyhow::Result;

use mockexam_core::parser;

pub fn execute(template_path: PathBuf, pool_path: Option<PathBuf>) -> Result<()> {
    let templates = if template_path.is_dir() {
        parser::load_template_directory(&template_path)?
    } else {
        vec![parser::parse_template(&template_path)?]
    };

    let pool = pool_path
        .as_deref()
        .map(parser::load_question_pool)
        .transpose()?;

    let mut total_warnings = 0;

    for template in &templates {
        println!(
            "Template: {} ({} questions, {} areas)",
            template.name,
            template.total_questions,
            template.blueprint.len()
        );

        let mut warnings = parser::validate_template(template);
        if let Some(pool) = &pool {
            warnings.extend(parser::validate_pool(template, pool));
        }
        for w in &warnings {
            let prefix = w
                .subject
                .as_ref()
                .map(|s| format!("  [{s}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All templates valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
