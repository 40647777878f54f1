pub mod compare;
pub mod generate;
pub mod init;
pub mod list_templates;
pub mod score;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use mockexam_core::catalog;
use mockexam_core::config::{load_config_from, MockExamConfig};
use mockexam_core::model::ExamTemplateConfig;
use mockexam_core::parser;

pub fn load_config(path: Option<PathBuf>) -> Result<MockExamConfig> {
    load_config_from(path.as_deref())
}

/// Built-in templates followed by those in the configured templates directory.
pub fn available_templates(config: &MockExamConfig) -> Result<Vec<ExamTemplateConfig>> {
    let mut templates = catalog::builtin_templates();
    if let Some(dir) = &config.templates_dir {
        if dir.is_dir() {
            templates.extend(parser::load_template_directory(dir)?);
        } else {
            tracing::warn!("templates_dir {} is not a directory", dir.display());
        }
    }
    Ok(templates)
}

/// Resolve `--template`: an existing file path, else a template id.
pub fn resolve_template(id_or_path: &str, config: &MockExamConfig) -> Result<ExamTemplateConfig> {
    let path = Path::new(id_or_path);
    if path.is_file() {
        return parser::parse_template(path);
    }

    available_templates(config)?
        .into_iter()
        .find(|t| t.id.eq_ignore_ascii_case(id_or_path))
        .with_context(|| {
            format!("unknown template '{id_or_path}' (run `mockexam list-templates` to see ids)")
        })
}
