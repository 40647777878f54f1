//! Tool configuration.
//!
//! Search order:
//! 1. `mockexam.toml` in the current directory
//! 2. `~/.config/mockexam/config.toml`
//!
//! Environment overrides: `MOCKEXAM_TEMPLATES_DIR`, `MOCKEXAM_OUTPUT_DIR`.
//! Path values may reference environment variables as `${VAR}`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::scorer::ScoringOptions;

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockExamConfig {
    /// Directory searched for template files, in addition to the catalog.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
    /// Where saved reports go by default.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Number of weak areas reported per attempt.
    #[serde(default = "default_weak_area_limit")]
    pub weak_area_limit: usize,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./mockexam-results")
}

fn default_weak_area_limit() -> usize {
    3
}

impl Default for MockExamConfig {
    fn default() -> Self {
        Self {
            templates_dir: None,
            output_dir: default_output_dir(),
            weak_area_limit: default_weak_area_limit(),
        }
    }
}

impl MockExamConfig {
    pub fn scoring_options(&self) -> ScoringOptions {
        ScoringOptions {
            weak_area_limit: self.weak_area_limit,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables expand to the empty string.
/// Expanded values are not scanned again.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from the default locations.
pub fn load_config() -> Result<MockExamConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<MockExamConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("mockexam.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<MockExamConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => MockExamConfig::default(),
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok());

    config.templates_dir = config.templates_dir.as_deref().map(resolve_path);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn apply_overrides(config: &mut MockExamConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = lookup("MOCKEXAM_TEMPLATES_DIR") {
        config.templates_dir = Some(PathBuf::from(dir));
    }
    if let Some(dir) = lookup("MOCKEXAM_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mockexam"))
}
