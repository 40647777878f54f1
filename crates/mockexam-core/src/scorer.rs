//! Exam scoring and weak-area analysis.
//!
//! Scoring is pure: the same exam and answers always give the same result.
//! Unanswered questions count as incorrect and show up in the review list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::blueprint::normalize_weights;
use crate::model::{AnswerMap, Difficulty, GeneratedExam};
use crate::scale::ScaleTransform;

/// Accuracy at or above which an area counts as strong.
pub const STRONG_THRESHOLD: f64 = 80.0;
/// Accuracy at or above which an area counts as proficient.
pub const PROFICIENT_THRESHOLD: f64 = 70.0;
/// Accuracy at or above which an area counts as developing.
pub const DEVELOPING_THRESHOLD: f64 = 55.0;

/// Mastery band for a blueprint area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryStatus {
    Weak,
    Developing,
    Proficient,
    Strong,
}

impl MasteryStatus {
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= STRONG_THRESHOLD {
            MasteryStatus::Strong
        } else if accuracy >= PROFICIENT_THRESHOLD {
            MasteryStatus::Proficient
        } else if accuracy >= DEVELOPING_THRESHOLD {
            MasteryStatus::Developing
        } else {
            MasteryStatus::Weak
        }
    }
}

impl std::fmt::Display for MasteryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MasteryStatus::Weak => write!(f, "weak"),
            MasteryStatus::Developing => write!(f, "developing"),
            MasteryStatus::Proficient => write!(f, "proficient"),
            MasteryStatus::Strong => write!(f, "strong"),
        }
    }
}

/// Performance in one blueprint area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintPerformance {
    pub area: String,
    pub name: String,
    /// Normalized blueprint weight, in percent.
    pub weight: f64,
    pub questions: u32,
    pub attempted: u32,
    pub correct: u32,
    /// Correct over questions in the area, in percent.
    pub accuracy: f64,
    /// Correct over attempted questions, in percent.
    pub answered_accuracy: f64,
    pub status: MasteryStatus,
}

/// Performance in one difficulty tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyPerformance {
    pub difficulty: Difficulty,
    pub questions: u32,
    pub attempted: u32,
    pub correct: u32,
    pub accuracy: f64,
    pub answered_accuracy: f64,
}

/// Why a question ended up in the review list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissReason {
    Unanswered,
    Incorrect { selected: usize, correct: usize },
}

/// A missed question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewQuestion {
    /// 1-based position in the exam.
    pub position: usize,
    pub id: String,
    pub blueprint_area: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub reason: MissReason,
}

/// A prioritized study suggestion for a weak area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRecommendation {
    pub area: String,
    pub name: String,
    pub accuracy: f64,
    pub weight: f64,
    pub status: MasteryStatus,
    pub message: String,
}

/// The scored outcome of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResult {
    pub template_id: String,
    pub seed: String,
    pub total_questions: u32,
    pub answered: u32,
    pub correct: u32,
    /// Correct over total questions, in percent.
    pub raw_percent: f64,
    pub scaled_score: f64,
    pub passing_score: f64,
    pub passed: bool,
    /// Per-area performance in template order.
    pub blueprint: Vec<BlueprintPerformance>,
    /// Per-tier performance, easiest first.
    pub difficulty: Vec<DifficultyPerformance>,
    /// Missed questions in exam order.
    pub review: Vec<ReviewQuestion>,
    /// Weakest areas, most urgent first.
    pub weak_areas: Vec<String>,
    pub recommendations: Vec<StudyRecommendation>,
}

impl ExamResult {
    pub fn area(&self, area: &str) -> Option<&BlueprintPerformance> {
        self.blueprint.iter().find(|p| p.area == area)
    }

    pub fn tier(&self, difficulty: Difficulty) -> Option<&DifficultyPerformance> {
        self.difficulty.iter().find(|p| p.difficulty == difficulty)
    }
}

/// Knobs for [`ExamScorer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringOptions {
    /// How many weak areas to report.
    pub weak_area_limit: usize,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self { weak_area_limit: 3 }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    questions: u32,
    attempted: u32,
    correct: u32,
}

impl Tally {
    fn record(&mut self, answered: bool, correct: bool) {
        self.questions += 1;
        if answered {
            self.attempted += 1;
        }
        if correct {
            self.correct += 1;
        }
    }

    fn accuracy(&self) -> f64 {
        percent(self.correct, self.questions)
    }

    fn answered_accuracy(&self) -> f64 {
        percent(self.correct, self.attempted)
    }
}

fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) * 100.0 / f64::from(whole)
    }
}

/// Scores attempts against generated exams.
#[derive(Debug, Clone, Default)]
pub struct ExamScorer {
    options: ScoringOptions,
}

impl ExamScorer {
    pub fn new(options: ScoringOptions) -> Self {
        Self { options }
    }

    /// Score using the scale carried by the exam's template.
    pub fn score(&self, exam: &GeneratedExam, answers: &AnswerMap, passing_score: f64) -> ExamResult {
        self.score_with_scale(exam, answers, passing_score, &exam.template.scale)
    }

    /// Score using an explicit scale transform.
    pub fn score_with_scale(
        &self,
        exam: &GeneratedExam,
        answers: &AnswerMap,
        passing_score: f64,
        scale: &dyn ScaleTransform,
    ) -> ExamResult {
        let template = &exam.template;

        let exam_ids: HashSet<&str> = exam.questions.iter().map(|q| q.id.as_str()).collect();
        let stray = answers.question_ids().filter(|id| !exam_ids.contains(id)).count();
        if stray > 0 {
            tracing::debug!(stray, "ignoring answers for questions outside the exam");
        }

        let mut overall = Tally::default();
        let mut areas = vec![Tally::default(); template.blueprint.len()];
        let mut tiers = [Tally::default(); 3];
        let mut review = Vec::new();

        for (i, question) in exam.questions.iter().enumerate() {
            let selected = answers.selection(&question.id);
            let correct = selected == Some(question.correct_option);
            let answered = selected.is_some();

            overall.record(answered, correct);
            tiers[question.difficulty.index()].record(answered, correct);
            match template
                .blueprint
                .iter()
                .position(|w| w.area == question.blueprint_area)
            {
                Some(a) => areas[a].record(answered, correct),
                None => tracing::debug!(
                    id = %question.id,
                    area = %question.blueprint_area,
                    "question area not in template blueprint"
                ),
            }

            if !correct {
                review.push(ReviewQuestion {
                    position: i + 1,
                    id: question.id.clone(),
                    blueprint_area: question.blueprint_area.clone(),
                    topic: question.topic.clone(),
                    difficulty: question.difficulty,
                    reason: match selected {
                        None => MissReason::Unanswered,
                        Some(selected) => MissReason::Incorrect {
                            selected,
                            correct: question.correct_option,
                        },
                    },
                });
            }
        }

        let weights = normalize_weights(&template.blueprint);
        let blueprint: Vec<BlueprintPerformance> = template
            .blueprint
            .iter()
            .zip(&areas)
            .enumerate()
            .filter(|(_, (_, tally))| tally.questions > 0)
            .map(|(i, (weight, tally))| {
                let accuracy = tally.accuracy();
                BlueprintPerformance {
                    area: weight.area.clone(),
                    name: weight.display_name().to_string(),
                    weight: weights.percent(i),
                    questions: tally.questions,
                    attempted: tally.attempted,
                    correct: tally.correct,
                    accuracy,
                    answered_accuracy: tally.answered_accuracy(),
                    status: MasteryStatus::from_accuracy(accuracy),
                }
            })
            .collect();

        let difficulty = Difficulty::ALL
            .into_iter()
            .zip(tiers)
            .filter(|(_, tally)| tally.questions > 0)
            .map(|(difficulty, tally)| DifficultyPerformance {
                difficulty,
                questions: tally.questions,
                attempted: tally.attempted,
                correct: tally.correct,
                accuracy: tally.accuracy(),
                answered_accuracy: tally.answered_accuracy(),
            })
            .collect();

        let ranked = rank_weak_areas(&blueprint, self.options.weak_area_limit);
        let recommendations = ranked.iter().copied().map(recommend).collect();
        let weak_areas = ranked.iter().map(|p| p.area.clone()).collect();

        let raw_percent = overall.accuracy();
        let scaled_score = scale.scale(raw_percent);

        ExamResult {
            template_id: template.id.clone(),
            seed: exam.seed.clone(),
            total_questions: overall.questions,
            answered: overall.attempted,
            correct: overall.correct,
            raw_percent,
            scaled_score,
            passing_score,
            passed: scaled_score >= passing_score,
            blueprint,
            difficulty,
            review,
            weak_areas,
            recommendations,
        }
    }
}

/// Score with default options and the template's scale.
pub fn score(exam: &GeneratedExam, answers: &AnswerMap, passing_score: f64) -> ExamResult {
    ExamScorer::default().score(exam, answers, passing_score)
}

/// Lowest accuracy first; heavier areas first among equals; template order last.
pub fn rank_weak_areas(
    performance: &[BlueprintPerformance],
    limit: usize,
) -> Vec<&BlueprintPerformance> {
    let mut ranked: Vec<&BlueprintPerformance> = performance.iter().collect();
    // Stable sort keeps template order for full ties.
    ranked.sort_by(|a, b| {
        a.accuracy
            .total_cmp(&b.accuracy)
            .then(b.weight.total_cmp(&a.weight))
    });
    ranked.truncate(limit);
    ranked
}

fn recommend(performance: &BlueprintPerformance) -> StudyRecommendation {
    let name = &performance.name;
    let accuracy = performance.accuracy;
    let message = match performance.status {
        MasteryStatus::Weak => format!(
            "Focus on {name}: {accuracy:.0}% correct in an area worth {:.0}% of the exam.",
            performance.weight
        ),
        MasteryStatus::Developing => format!(
            "Strengthen {name}: {accuracy:.0}% correct, aim for {PROFICIENT_THRESHOLD:.0}% or better."
        ),
        MasteryStatus::Proficient | MasteryStatus::Strong => {
            format!("Review {name} to keep your {accuracy:.0}% accuracy.")
        }
    };
    StudyRecommendation {
        area: performance.area.clone(),
        name: name.clone(),
        accuracy,
        weight: performance.weight,
        status: performance.status,
        message,
    }
}
