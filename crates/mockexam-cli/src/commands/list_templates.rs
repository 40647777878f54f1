//! The `mockexam list-templates` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn execute(certification: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let templates: Vec<_> = super::available_templates(&config)?
        .into_iter()
        .filter(|t| {
            certification
                .as_ref()
                .map_or(true, |c| t.certification.eq_ignore_ascii_case(c))
        })
        .collect();

    if templates.is_empty() {
        println!("No templates found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Name",
        "Certification",
        "Questions",
        "Minutes",
        "Passing",
        "Areas",
    ]);
    for t in &templates {
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(&t.name),
            Cell::new(&t.certification),
            Cell::new(t.total_questions),
            Cell::new(t.time_limit_minutes),
            Cell::new(t.passing_score),
            Cell::new(t.blueprint.len()),
        ]);
    }
    println!("{table}");

    Ok(())
}
