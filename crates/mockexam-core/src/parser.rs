//! Exam template, question pool, and answer loading.
//!
//! Templates are TOML files; pools and answer maps are JSON. Validation
//! reports problems as warnings and never rejects a file outright.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::blueprint::{largest_remainder, normalize_weights, resolve_area, WEIGHT_SUM_TOLERANCE};
use crate::model::{
    AnswerMap, BlueprintWeight, CandidateQuestion, Difficulty, DifficultyDistribution,
    ExamTemplateConfig, ItemSet, TestletConfig,
};
use crate::scale::{ScaleTransform, ScoreScale};

/// Intermediate TOML structure for template files.
#[derive(Debug, Deserialize)]
struct TomlTemplateFile {
    template: TomlTemplateHeader,
    #[serde(default)]
    blueprint: Vec<TomlBlueprintWeight>,
    #[serde(default)]
    testlets: Vec<TestletConfig>,
    #[serde(default)]
    item_sets: Vec<ItemSet>,
}

#[derive(Debug, Deserialize)]
struct TomlTemplateHeader {
    id: String,
    name: String,
    #[serde(default)]
    certification: String,
    #[serde(default)]
    section: String,
    total_questions: u32,
    #[serde(default = "default_time_limit")]
    time_limit_minutes: u32,
    #[serde(default = "default_passing_score")]
    passing_score: f64,
    #[serde(default)]
    difficulty: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    scale: Option<ScoreScale>,
}

fn default_time_limit() -> u32 {
    60
}

fn default_passing_score() -> f64 {
    75.0
}

#[derive(Debug, Deserialize)]
struct TomlBlueprintWeight {
    area: String,
    #[serde(default)]
    name: String,
    weight: f64,
    #[serde(default)]
    min_questions: Option<u32>,
    #[serde(default)]
    max_questions: Option<u32>,
}

/// Parse a single TOML file into an `ExamTemplateConfig`.
pub fn parse_template(path: &Path) -> Result<ExamTemplateConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read template file: {}", path.display()))?;

    parse_template_str(&content, path)
}

/// Parse a TOML string into an `ExamTemplateConfig`.
pub fn parse_template_str(content: &str, source_path: &Path) -> Result<ExamTemplateConfig> {
    let parsed: TomlTemplateFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let header = parsed.template;
    let difficulty = match header.difficulty {
        Some(tiers) => tiers
            .into_iter()
            .map(|(tier, share)| {
                let tier: Difficulty = tier.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;
                Ok::<_, anyhow::Error>((tier, share))
            })
            .collect::<Result<DifficultyDistribution>>()?,
        None => DifficultyDistribution::default(),
    };

    let blueprint = parsed
        .blueprint
        .into_iter()
        .map(|w| BlueprintWeight {
            area: w.area,
            name: w.name,
            weight: w.weight,
            min_questions: w.min_questions,
            max_questions: w.max_questions,
        })
        .collect();

    Ok(ExamTemplateConfig {
        id: header.id,
        name: header.name,
        certification: header.certification,
        section: header.section,
        total_questions: header.total_questions,
        time_limit_minutes: header.time_limit_minutes,
        passing_score: header.passing_score,
        blueprint,
        difficulty,
        scale: header.scale.unwrap_or_default(),
        testlets: parsed.testlets,
        item_sets: parsed.item_sets,
    })
}

/// Recursively load all `.toml` templates from a directory.
pub fn load_template_directory(dir: &Path) -> Result<Vec<ExamTemplateConfig>> {
    let mut templates = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            templates.extend(load_template_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_template(&path) {
                Ok(template) => templates.push(template),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(templates)
}

/// Load a JSON array of questions.
pub fn load_question_pool(path: &Path) -> Result<Vec<CandidateQuestion>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question pool: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse question pool: {}", path.display()))
}

/// Load a JSON object mapping question ids to selected options.
pub fn load_answers(path: &Path) -> Result<AnswerMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers: {}", path.display()))
}

/// A warning from template or pool validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The blueprint area or question id concerned, if any.
    pub subject: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn general(message: impl Into<String>) -> Self {
        Self {
            subject: None,
            message: message.into(),
        }
    }

    fn about(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            message: message.into(),
        }
    }
}

/// Validate a template for common issues.
pub fn validate_template(template: &ExamTemplateConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if template.total_questions == 0 {
        warnings.push(ValidationWarning::general("total_questions is 0"));
    }

    if template.blueprint.is_empty() {
        warnings.push(ValidationWarning::general("no blueprint areas defined"));
    }

    let sum: f64 = template.blueprint.iter().map(|w| w.weight).sum();
    if !template.blueprint.is_empty() && (sum - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
        warnings.push(ValidationWarning::general(format!(
            "blueprint weights sum to {sum:.1}, expected 100"
        )));
    }

    let mut seen = HashSet::new();
    for weight in &template.blueprint {
        if !seen.insert(weight.area.as_str()) {
            warnings.push(ValidationWarning::about(
                &weight.area,
                format!("duplicate blueprint area: {}", weight.area),
            ));
        }
        if !weight.weight.is_finite() || weight.weight < 0.0 {
            warnings.push(ValidationWarning::about(
                &weight.area,
                format!("invalid weight: {}", weight.weight),
            ));
        }
        if let (Some(min), Some(max)) = (weight.min_questions, weight.max_questions) {
            if min > max {
                warnings.push(ValidationWarning::about(
                    &weight.area,
                    format!("min_questions {min} exceeds max_questions {max}"),
                ));
            }
        }
    }

    let min_sum: u64 = template
        .blueprint
        .iter()
        .map(|w| u64::from(w.min_questions.unwrap_or(0)))
        .sum();
    if min_sum > u64::from(template.total_questions) {
        warnings.push(ValidationWarning::general(format!(
            "min_questions sum to {min_sum}, more than total_questions {}",
            template.total_questions
        )));
    }

    validate_testlets(template, &mut warnings);
    validate_item_sets(template, &mut warnings);

    let shares = template.difficulty.shares();
    if shares.iter().all(|s| !s.is_finite() || *s <= 0.0) {
        warnings.push(ValidationWarning::general(
            "difficulty distribution has no positive share",
        ));
    }

    if let ScoreScale::Table { points } = &template.scale {
        if points.len() < 2 {
            warnings.push(ValidationWarning::general(
                "scale table needs at least two points",
            ));
        }
        if points.iter().any(|p| !(0.0..=100.0).contains(&p.raw)) {
            warnings.push(ValidationWarning::general(
                "scale table raw values must be within 0-100",
            ));
        }
    }

    let (low, high) = template.scale.bounds();
    if template.passing_score < low || template.passing_score > high {
        warnings.push(ValidationWarning::general(format!(
            "passing score {} is outside the scale range {low}-{high}",
            template.passing_score
        )));
    }

    warnings
}

fn validate_testlets(template: &ExamTemplateConfig, warnings: &mut Vec<ValidationWarning>) {
    if template.testlets.is_empty() {
        return;
    }

    let mut seen = HashSet::new();
    for testlet in &template.testlets {
        if !seen.insert(testlet.id.as_str()) {
            warnings.push(ValidationWarning::about(
                &testlet.id,
                format!("duplicate testlet: {}", testlet.id),
            ));
        }
        if testlet.question_count == 0 {
            warnings.push(ValidationWarning::about(&testlet.id, "question_count is 0"));
        }
        for filter in &testlet.areas {
            let known = template.blueprint.iter().any(|w| {
                crate::blueprint::tag_in_area(filter, &w.area)
                    || crate::blueprint::tag_in_area(&w.area, filter)
            });
            if !known {
                warnings.push(ValidationWarning::about(
                    &testlet.id,
                    format!("area {filter} matches no blueprint area"),
                ));
            }
        }
        let curated = testlet.question_ids.len() as u64;
        if testlet.is_curated() && curated < u64::from(testlet.question_count) {
            warnings.push(ValidationWarning::about(
                &testlet.id,
                format!(
                    "{} curated questions for a testlet of {}",
                    testlet.question_ids.len(),
                    testlet.question_count
                ),
            ));
        }
    }

    let requested = template.requested_questions();
    if requested != template.total_questions {
        warnings.push(ValidationWarning::general(format!(
            "testlets hold {requested} questions but total_questions is {}",
            template.total_questions
        )));
    }

    let minutes: u64 = template
        .testlets
        .iter()
        .map(|t| u64::from(t.time_limit_minutes))
        .sum();
    if template.time_limit_minutes > 0 && minutes > u64::from(template.time_limit_minutes) {
        warnings.push(ValidationWarning::general(format!(
            "testlets take {minutes} minutes but the time limit is {}",
            template.time_limit_minutes
        )));
    }
}

fn validate_item_sets(template: &ExamTemplateConfig, warnings: &mut Vec<ValidationWarning>) {
    let mut seen = HashSet::new();
    for set in &template.item_sets {
        if !seen.insert(set.id.as_str()) {
            warnings.push(ValidationWarning::about(
                &set.id,
                format!("duplicate item set: {}", set.id),
            ));
        }
        if set.question_ids.is_empty() {
            warnings.push(ValidationWarning::about(&set.id, "item set has no questions"));
        }

        let room = if template.testlets.is_empty() {
            Some(template.total_questions)
        } else {
            match set.testlet.as_deref().and_then(|id| template.testlet(id)) {
                Some(testlet) => Some(testlet.question_count),
                None => {
                    warnings.push(ValidationWarning::about(
                        &set.id,
                        "item set must name one of the template's testlets",
                    ));
                    None
                }
            }
        };
        if let Some(room) = room {
            if set.question_ids.len() as u64 > u64::from(room) {
                warnings.push(ValidationWarning::about(
                    &set.id,
                    format!(
                        "item set has {} questions but its section holds {room}",
                        set.question_ids.len()
                    ),
                ));
            }
        }
    }
}

/// Validate a question pool against a template.
pub fn validate_pool(
    template: &ExamTemplateConfig,
    pool: &[CandidateQuestion],
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    let mut available = vec![0u32; template.blueprint.len()];

    for question in pool {
        if !seen.insert(question.id.as_str()) {
            warnings.push(ValidationWarning::about(
                &question.id,
                format!("duplicate question ID: {}", question.id),
            ));
            continue;
        }
        if question.payload.options.len() < 2 {
            warnings.push(ValidationWarning::about(
                &question.id,
                "fewer than two options",
            ));
        }
        if question.payload.correct_option >= question.payload.options.len() {
            warnings.push(ValidationWarning::about(
                &question.id,
                format!(
                    "correct_option {} is out of range for {} options",
                    question.payload.correct_option,
                    question.payload.options.len()
                ),
            ));
        }
        match resolve_area(&question.blueprint_area, &template.blueprint)
            .and_then(|area| template.blueprint.iter().position(|w| w.area == area))
        {
            Some(i) => available[i] += 1,
            None => warnings.push(ValidationWarning::about(
                &question.id,
                format!(
                    "area {} is not in template {}",
                    question.blueprint_area, template.id
                ),
            )),
        }
    }

    let curated = template
        .testlets
        .iter()
        .map(|t| (t.id.as_str(), &t.question_ids))
        .chain(template.item_sets.iter().map(|s| (s.id.as_str(), &s.question_ids)));
    for (owner, ids) in curated {
        for id in ids.iter().filter(|id| !seen.contains(id.as_str())) {
            warnings.push(ValidationWarning::about(
                owner,
                format!("question {id} is not in the pool"),
            ));
        }
    }

    let percents = normalize_weights(&template.blueprint).percents;
    let targets = largest_remainder(template.total_questions, &percents);
    for ((weight, target), have) in template.blueprint.iter().zip(targets).zip(available) {
        if have < target {
            warnings.push(ValidationWarning::about(
                &weight.area,
                format!("area {} needs {target} questions but the pool has {have}", weight.area),
            ));
        }
    }

    warnings
}
