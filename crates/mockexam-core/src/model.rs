//! Core data model types for mockexam.
//!
//! These are the records exchanged with the content collaborator (templates
//! and question pools) and with the session collaborator (generated exams
//! and answer maps). All of them are plain serde records.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::blueprint::tag_in_area;
use crate::generator::GenerationWarning;
use crate::scale::ScoreScale;

/// Difficulty tier of a question.
///
/// Serialized in lowercase. Deserialization goes through [`FromStr`], so
/// content using other casings or the beginner/intermediate/advanced
/// vocabulary loads as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All tiers, easiest first.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    fn rank(self) -> i8 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    /// Position in [`Difficulty::ALL`].
    pub fn index(self) -> usize {
        self.rank() as usize
    }

    /// The other tiers, nearest first. Ties go to the easier tier.
    pub fn neighbors(self) -> Vec<Difficulty> {
        let mut others: Vec<Difficulty> = Self::ALL.into_iter().filter(|d| *d != self).collect();
        others.sort_by_key(|d| ((d.rank() - self.rank()).abs(), d.rank()));
        others
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "beginner" => Ok(Difficulty::Easy),
            "medium" | "intermediate" => Ok(Difficulty::Medium),
            "hard" | "advanced" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Target share of the exam for one blueprint area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintWeight {
    /// Blueprint area identifier (e.g. "FAR-II").
    pub area: String,
    /// Human-readable area name.
    #[serde(default)]
    pub name: String,
    /// Percentage of the exam (0-100).
    pub weight: f64,
    /// Lower bound on the absolute question count.
    #[serde(default)]
    pub min_questions: Option<u32>,
    /// Upper bound on the absolute question count.
    #[serde(default)]
    pub max_questions: Option<u32>,
}

impl BlueprintWeight {
    pub fn new(area: impl Into<String>, weight: f64) -> Self {
        Self {
            area: area.into(),
            name: String::new(),
            weight,
            min_questions: None,
            max_questions: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name for display, falling back to the area id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.area
        } else {
            &self.name
        }
    }
}

/// Target proportions of each difficulty tier, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DifficultyDistribution(BTreeMap<Difficulty, f64>);

impl DifficultyDistribution {
    pub fn new(easy: f64, medium: f64, hard: f64) -> Self {
        Self(BTreeMap::from([
            (Difficulty::Easy, easy),
            (Difficulty::Medium, medium),
            (Difficulty::Hard, hard),
        ]))
    }

    /// Share for a tier; tiers not listed get 0.
    pub fn share(&self, difficulty: Difficulty) -> f64 {
        self.0.get(&difficulty).copied().unwrap_or(0.0)
    }

    /// Shares for every tier in easy-to-hard order.
    pub fn shares(&self) -> [f64; 3] {
        Difficulty::ALL.map(|d| self.share(d))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for DifficultyDistribution {
    fn default() -> Self {
        Self::new(30.0, 50.0, 20.0)
    }
}

impl FromIterator<(Difficulty, f64)> for DifficultyDistribution {
    fn from_iter<I: IntoIterator<Item = (Difficulty, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An ordered block of an exam with its own size, time, and selection
/// filters.
///
/// Filters narrow the pool; within them questions are still drawn by
/// blueprint weight and difficulty mix. A testlet with curated
/// `question_ids` uses those questions, in order, instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestletConfig {
    /// Identifier, unique within the template.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Number of questions in the testlet.
    pub question_count: u32,
    /// Time allotted to the testlet, in minutes.
    #[serde(default)]
    pub time_limit_minutes: u32,
    /// Area tags the testlet draws from. Empty means every area.
    #[serde(default)]
    pub areas: Vec<String>,
    /// Allowed difficulty tiers. Empty means every tier.
    #[serde(default)]
    pub difficulties: Vec<Difficulty>,
    /// Allowed topics. Empty means every topic.
    #[serde(default)]
    pub topics: Vec<String>,
    /// Curated question ids.
    #[serde(default)]
    pub question_ids: Vec<String>,
}

impl TestletConfig {
    pub fn new(id: impl Into<String>, question_count: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            question_count,
            time_limit_minutes: 0,
            areas: Vec::new(),
            difficulties: Vec::new(),
            topics: Vec::new(),
            question_ids: Vec::new(),
        }
    }

    pub fn is_curated(&self) -> bool {
        !self.question_ids.is_empty()
    }

    /// Whether a blueprint area can contribute to this testlet, either
    /// whole or through one of its subdivisions.
    pub fn covers_area(&self, area: &str) -> bool {
        self.areas.is_empty()
            || self
                .areas
                .iter()
                .any(|filter| tag_in_area(area, filter) || tag_in_area(filter, area))
    }

    /// Whether a pool question passes the area, difficulty, and topic filters.
    pub fn admits(&self, question: &CandidateQuestion) -> bool {
        (self.areas.is_empty()
            || self
                .areas
                .iter()
                .any(|filter| tag_in_area(&question.blueprint_area, filter)))
            && (self.difficulties.is_empty() || self.difficulties.contains(&question.difficulty))
            && (self.topics.is_empty() || self.topics.contains(&question.topic))
    }
}

/// Questions built on one shared scenario. They are always presented
/// together and in the listed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSet {
    /// Identifier, unique within the template.
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Scenario text shown before the questions.
    #[serde(default)]
    pub scenario: String,
    /// Pool ids of the set's questions.
    pub question_ids: Vec<String>,
    /// Testlet the set is placed in. Required when the template has
    /// testlets.
    #[serde(default)]
    pub testlet: Option<String>,
}

/// One buildable exam variant. Defined once and never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamTemplateConfig {
    /// Unique identifier (e.g. "cpa-far-mcq").
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Certification (e.g. "CPA").
    #[serde(default)]
    pub certification: String,
    /// Certification section (e.g. "FAR").
    #[serde(default)]
    pub section: String,
    /// Number of questions to select.
    pub total_questions: u32,
    /// Time limit in minutes.
    #[serde(default)]
    pub time_limit_minutes: u32,
    /// Passing threshold on the reporting scale.
    pub passing_score: f64,
    /// Blueprint areas in display order.
    #[serde(default)]
    pub blueprint: Vec<BlueprintWeight>,
    /// Target difficulty mix.
    #[serde(default)]
    pub difficulty: DifficultyDistribution,
    /// Raw-percent to reporting-scale transform.
    #[serde(default)]
    pub scale: ScoreScale,
    /// Ordered testlets. Empty means one draw of `total_questions`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub testlets: Vec<TestletConfig>,
    /// Scenario-based question groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_sets: Vec<ItemSet>,
}

impl ExamTemplateConfig {
    /// Look up a blueprint area by id.
    pub fn area(&self, area: &str) -> Option<&BlueprintWeight> {
        self.blueprint.iter().find(|w| w.area == area)
    }

    pub fn testlet(&self, id: &str) -> Option<&TestletConfig> {
        self.testlets.iter().find(|t| t.id == id)
    }

    pub fn item_set(&self, id: &str) -> Option<&ItemSet> {
        self.item_sets.iter().find(|s| s.id == id)
    }

    /// Number of questions a full exam has: the testlet sizes when
    /// testlets are defined, otherwise `total_questions`.
    pub fn requested_questions(&self) -> u32 {
        if self.testlets.is_empty() {
            self.total_questions
        } else {
            self.testlets
                .iter()
                .fold(0u32, |sum, t| sum.saturating_add(t.question_count))
        }
    }
}

/// The question content carried by a pool entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionPayload {
    /// Question stem.
    pub prompt: String,
    /// Answer options.
    pub options: Vec<String>,
    /// Index of the correct option.
    pub correct_option: usize,
    /// Explanation shown during review.
    #[serde(default)]
    pub explanation: String,
}

/// A question from the content pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateQuestion {
    /// Unique identifier.
    pub id: String,
    /// Blueprint area tag. May be more specific than the template area
    /// (e.g. "FAR-III-E-3" under "FAR-III").
    pub blueprint_area: String,
    /// Topic within the area.
    #[serde(default)]
    pub topic: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Question content.
    #[serde(flatten)]
    pub payload: QuestionPayload,
}

/// A selected question as it appears in a generated exam.
///
/// Only the answer key travels with the exam; prompt, options and
/// explanation stay with the content pool and are looked up by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamQuestion {
    /// Question id in the content pool.
    pub id: String,
    /// Template blueprint area the question was drawn for.
    pub blueprint_area: String,
    /// Topic within the area.
    #[serde(default)]
    pub topic: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Index of the correct option.
    pub correct_option: usize,
    /// Testlet the question was drawn for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testlet: Option<String>,
    /// Item set the question belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_set: Option<String>,
}

impl ExamQuestion {
    pub(crate) fn from_candidate(
        candidate: &CandidateQuestion,
        area: &str,
        testlet: Option<&str>,
        item_set: Option<&str>,
    ) -> Self {
        Self {
            id: candidate.id.clone(),
            blueprint_area: area.to_string(),
            topic: candidate.topic.clone(),
            difficulty: candidate.difficulty,
            correct_option: candidate.payload.correct_option,
            testlet: testlet.map(str::to_string),
            item_set: item_set.map(str::to_string),
        }
    }
}

/// An exam produced by the generator. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedExam {
    /// The template the exam was built from.
    pub template: ExamTemplateConfig,
    /// Seed that reproduces this exam.
    pub seed: String,
    /// Questions in presentation order.
    pub questions: Vec<ExamQuestion>,
    /// Non-fatal problems encountered while building the exam.
    #[serde(default)]
    pub warnings: Vec<GenerationWarning>,
}

impl GeneratedExam {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question ids in presentation order.
    pub fn question_ids(&self) -> Vec<&str> {
        self.questions.iter().map(|q| q.id.as_str()).collect()
    }

    /// Number of selected questions per blueprint area.
    pub fn count_by_area(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for q in &self.questions {
            *counts.entry(q.blueprint_area.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Questions of one testlet, in presentation order.
    pub fn testlet_questions(&self, testlet: &str) -> Vec<&ExamQuestion> {
        self.questions
            .iter()
            .filter(|q| q.testlet.as_deref() == Some(testlet))
            .collect()
    }

    /// Number of selected questions per difficulty tier.
    pub fn count_by_difficulty(&self) -> BTreeMap<Difficulty, usize> {
        let mut counts = BTreeMap::new();
        for q in &self.questions {
            *counts.entry(q.difficulty).or_insert(0) += 1;
        }
        counts
    }
}

/// The user's selections, keyed by question id. `None` means the question
/// was seen but left unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<String, Option<usize>>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a selected option.
    pub fn select(&mut self, question_id: impl Into<String>, option: usize) {
        self.0.insert(question_id.into(), Some(option));
    }

    /// Mark a question as explicitly unanswered.
    pub fn clear(&mut self, question_id: impl Into<String>) {
        self.0.insert(question_id.into(), None);
    }

    /// The selected option, if any.
    pub fn selection(&self, question_id: &str) -> Option<usize> {
        self.0.get(question_id).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn question_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, usize)> for AnswerMap {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(id, opt)| (id, Some(opt))).collect())
    }
}
