//! Saved attempts with JSON persistence and progress comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::GeneratedExam;
use crate::scorer::{ExamResult, MissReason};

/// A scored attempt as saved to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the attempt was scored.
    pub created_at: DateTime<Utc>,
    /// Summary of the exam that was taken.
    pub exam: ExamSummary,
    /// The scored outcome.
    pub result: ExamResult,
}

/// Summary of a generated exam (without the question list).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSummary {
    pub template_id: String,
    pub template_name: String,
    pub certification: String,
    pub section: String,
    pub seed: String,
    pub question_count: usize,
    pub time_limit_minutes: u32,
    /// Generation warnings, rendered as text.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ExamSummary {
    pub fn from_exam(exam: &GeneratedExam) -> Self {
        Self {
            template_id: exam.template.id.clone(),
            template_name: exam.template.name.clone(),
            certification: exam.template.certification.clone(),
            section: exam.template.section.clone(),
            seed: exam.seed.clone(),
            question_count: exam.len(),
            time_limit_minutes: exam.template.time_limit_minutes,
            warnings: exam.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

impl ExamReport {
    /// Wrap a scored attempt with a fresh id and the current time.
    pub fn new(exam: &GeneratedExam, result: ExamResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            exam: ExamSummary::from_exam(exam),
            result,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ExamReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the attempt as markdown.
    pub fn to_markdown(&self) -> String {
        let r = &self.result;
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", self.exam.template_name));
        md.push_str(&format!(
            "**Score:** {:.1} (passing {:.1}) - **{}**\n\n",
            r.scaled_score,
            r.passing_score,
            if r.passed { "PASS" } else { "FAIL" }
        ));
        md.push_str(&format!(
            "{} of {} correct ({:.1}%), {} answered. Seed `{}`.\n\n",
            r.correct, r.total_questions, r.raw_percent, r.answered, self.exam.seed
        ));

        if !r.blueprint.is_empty() {
            md.push_str("## Blueprint Areas\n\n");
            md.push_str("| Area | Name | Weight | Correct | Accuracy | Status |\n");
            md.push_str("|------|------|--------|---------|----------|--------|\n");
            for p in &r.blueprint {
                md.push_str(&format!(
                    "| {} | {} | {:.0}% | {}/{} | {:.1}% | {} |\n",
                    p.area, p.name, p.weight, p.correct, p.questions, p.accuracy, p.status
                ));
            }
            md.push('\n');
        }

        if !r.difficulty.is_empty() {
            md.push_str("## Difficulty\n\n");
            md.push_str("| Tier | Correct | Accuracy |\n");
            md.push_str("|------|---------|----------|\n");
            for d in &r.difficulty {
                md.push_str(&format!(
                    "| {} | {}/{} | {:.1}% |\n",
                    d.difficulty, d.correct, d.questions, d.accuracy
                ));
            }
            md.push('\n');
        }

        if !r.recommendations.is_empty() {
            md.push_str("## Study Recommendations\n\n");
            for rec in &r.recommendations {
                md.push_str(&format!("- {}\n", rec.message));
            }
            md.push('\n');
        }

        if !r.review.is_empty() {
            md.push_str("## Review\n\n");
            for q in &r.review {
                let reason = match q.reason {
                    MissReason::Unanswered => "unanswered".to_string(),
                    MissReason::Incorrect { selected, correct } => {
                        format!("chose {selected}, correct {correct}")
                    }
                };
                md.push_str(&format!(
                    "- #{} `{}` ({}, {}): {}\n",
                    q.position, q.id, q.blueprint_area, q.difficulty, reason
                ));
            }
            md.push('\n');
        }

        if !self.exam.warnings.is_empty() {
            md.push_str("## Generation Warnings\n\n");
            for w in &self.exam.warnings {
                md.push_str(&format!("- {w}\n"));
            }
        }

        md
    }

    /// Compare this attempt against an earlier one, per blueprint area.
    ///
    /// `threshold` is in accuracy percentage points.
    pub fn compare(&self, baseline: &ExamReport, threshold: f64) -> ProgressReport {
        let baseline_areas: HashMap<&str, f64> = baseline
            .result
            .blueprint
            .iter()
            .map(|p| (p.area.as_str(), p.accuracy))
            .collect();

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_areas = Vec::new();

        for p in &self.result.blueprint {
            let Some(&before) = baseline_areas.get(p.area.as_str()) else {
                new_areas.push(p.area.clone());
                continue;
            };
            let change = AreaChange {
                area: p.area.clone(),
                name: p.name.clone(),
                baseline_accuracy: before,
                current_accuracy: p.accuracy,
                delta: p.accuracy - before,
            };
            if change.delta < -threshold {
                regressions.push(change);
            } else if change.delta > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let removed_areas = baseline
            .result
            .blueprint
            .iter()
            .filter(|b| self.result.area(&b.area).is_none())
            .map(|b| b.area.clone())
            .collect();

        ProgressReport {
            baseline_score: baseline.result.scaled_score,
            current_score: self.result.scaled_score,
            score_delta: self.result.scaled_score - baseline.result.scaled_score,
            regressions,
            improvements,
            unchanged,
            new_areas,
            removed_areas,
        }
    }
}

/// Result of comparing two attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    pub baseline_score: f64,
    pub current_score: f64,
    pub score_delta: f64,
    /// Areas where accuracy went down.
    pub regressions: Vec<AreaChange>,
    /// Areas where accuracy went up.
    pub improvements: Vec<AreaChange>,
    /// Areas with no significant change.
    pub unchanged: usize,
    /// Areas in current but not baseline.
    pub new_areas: Vec<String>,
    /// Areas in baseline but not current.
    pub removed_areas: Vec<String>,
}

/// Accuracy movement in one blueprint area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaChange {
    pub area: String,
    pub name: String,
    pub baseline_accuracy: f64,
    pub current_accuracy: f64,
    pub delta: f64,
}

impl ProgressReport {
    /// Format the progress report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Score:** {:.1} -> {:.1} ({:+.1})\n\n",
            self.baseline_score, self.current_score, self.score_delta
        ));
        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        for (title, changes) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Area | Name | Baseline | Current | Delta |\n");
            md.push_str("|------|------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {} | {:.1}% | {:.1}% | {:+.1}% |\n",
                    c.area, c.name, c.baseline_accuracy, c.current_accuracy, c.delta
                ));
            }
            md.push('\n');
        }

        if !self.new_areas.is_empty() {
            md.push_str(&format!("New areas: {}\n\n", self.new_areas.join(", ")));
        }
        if !self.removed_areas.is_empty() {
            md.push_str(&format!("Removed areas: {}\n", self.removed_areas.join(", ")));
        }

        md
    }

    /// Returns true if any area regressed.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}
