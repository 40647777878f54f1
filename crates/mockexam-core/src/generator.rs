//! Blueprint-weighted, difficulty-balanced exam generation.
//!
//! The generator samples a question pool so that each blueprint area gets
//! its weighted share of the exam and each area's share follows the
//! template's difficulty mix. An under-populated pool never fails the
//! build: shortfalls are backfilled (first from other difficulty tiers of
//! the same area, then from other areas) and reported as
//! [`GenerationWarning`]s.
//!
//! Templates with testlets are built one testlet at a time, in order, and
//! no question appears in two testlets. Item sets are placed whole and stay
//! together when the presentation order is shuffled.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blueprint::{largest_remainder, normalize_weights, resolve_area};
use crate::error::ConfigurationError;
use crate::model::{
    BlueprintWeight, CandidateQuestion, Difficulty, DifficultyDistribution, ExamQuestion,
    ExamTemplateConfig, GeneratedExam, ItemSet, TestletConfig,
};
use crate::random::{shuffle, Mulberry32, SeededRandom};

/// A non-fatal problem found while building an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationWarning {
    /// The pool had no questions at all.
    EmptyPool,
    /// Blueprint weights did not sum to 100 and were rescaled.
    WeightsNormalized { original_sum: f64 },
    /// Every blueprint weight was zero; areas share the exam equally.
    EqualWeightsFallback,
    /// A weight was negative or not a number and was treated as zero.
    InvalidWeight { area: String, weight: f64 },
    /// The difficulty mix had no positive share; tiers share equally.
    DifficultyFallback,
    /// A question id appeared more than once; later copies were ignored.
    DuplicateQuestion { id: String },
    /// An area had fewer candidates than its target.
    AreaShortfall {
        area: String,
        requested: u32,
        available: u32,
    },
    /// An area received extra questions to cover shortfalls elsewhere.
    Backfilled { area: String, extra: u32 },
    /// A difficulty tier within an area ran short and was filled from
    /// neighboring tiers.
    DifficultyShortfall {
        area: String,
        difficulty: Difficulty,
        requested: u32,
        available: u32,
    },
    /// The exam has fewer questions than requested even after backfill.
    PoolExhausted { requested: u32, selected: u32 },
    /// A testlet has fewer questions than its size.
    TestletShortfall {
        testlet: String,
        requested: u32,
        selected: u32,
    },
    /// A curated question id is not in the pool or not in the blueprint.
    MissingQuestion { id: String },
    /// A curated question id was already placed and was not repeated.
    QuestionReused { id: String },
    /// An item set was larger than the room left in its section.
    ItemSetSkipped {
        item_set: String,
        questions: u32,
        room: u32,
    },
    /// An item set names no testlet of the template.
    ItemSetUnplaced { item_set: String },
}

impl GenerationWarning {
    /// The blueprint area this warning concerns, if any.
    pub fn area(&self) -> Option<&str> {
        match self {
            GenerationWarning::InvalidWeight { area, .. }
            | GenerationWarning::AreaShortfall { area, .. }
            | GenerationWarning::Backfilled { area, .. }
            | GenerationWarning::DifficultyShortfall { area, .. } => Some(area),
            _ => None,
        }
    }
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationWarning::EmptyPool => write!(f, "question pool is empty"),
            GenerationWarning::WeightsNormalized { original_sum } => write!(
                f,
                "blueprint weights sum to {original_sum:.1}, normalized to 100"
            ),
            GenerationWarning::EqualWeightsFallback => {
                write!(f, "all blueprint weights are zero, using equal weights")
            }
            GenerationWarning::InvalidWeight { area, weight } => write!(
                f,
                "area {area}: invalid weight {weight}, treated as 0"
            ),
            GenerationWarning::DifficultyFallback => write!(
                f,
                "difficulty distribution has no positive share, using equal tiers"
            ),
            GenerationWarning::DuplicateQuestion { id } => {
                write!(f, "duplicate question id {id} ignored")
            }
            GenerationWarning::AreaShortfall {
                area,
                requested,
                available,
            } => write!(
                f,
                "area {area}: requested {requested} questions but only {available} available"
            ),
            GenerationWarning::Backfilled { area, extra } => write!(
                f,
                "area {area}: added {extra} questions to cover shortfalls in other areas"
            ),
            GenerationWarning::DifficultyShortfall {
                area,
                difficulty,
                requested,
                available,
            } => write!(
                f,
                "area {area}: requested {requested} {difficulty} questions but only {available} available, filled from other tiers"
            ),
            GenerationWarning::PoolExhausted {
                requested,
                selected,
            } => write!(
                f,
                "pool exhausted: selected {selected} of {requested} questions"
            ),
            GenerationWarning::TestletShortfall {
                testlet,
                requested,
                selected,
            } => write!(
                f,
                "testlet {testlet}: selected {selected} of {requested} questions"
            ),
            GenerationWarning::MissingQuestion { id } => {
                write!(f, "curated question {id} is not in the pool or blueprint")
            }
            GenerationWarning::QuestionReused { id } => {
                write!(f, "curated question {id} is already in the exam")
            }
            GenerationWarning::ItemSetSkipped {
                item_set,
                questions,
                room,
            } => write!(
                f,
                "item set {item_set}: {questions} questions do not fit in the {room} remaining slots"
            ),
            GenerationWarning::ItemSetUnplaced { item_set } => {
                write!(f, "item set {item_set} names no testlet of the template")
            }
        }
    }
}

/// Candidates of one blueprint area, split by difficulty tier.
#[derive(Debug, Default, Clone)]
struct AreaPool<'a> {
    tiers: [Vec<&'a CandidateQuestion>; 3],
}

impl AreaPool<'_> {
    fn available(&self) -> u32 {
        self.tiers.iter().map(|t| t.len() as u32).sum()
    }
}

/// One ordered block of the exam: the whole exam, or one testlet.
struct Section<'t> {
    testlet: Option<&'t TestletConfig>,
    count: u32,
    item_sets: Vec<&'t ItemSet>,
}

impl Section<'_> {
    fn testlet_id(&self) -> Option<&str> {
        self.testlet.map(|t| t.id.as_str())
    }
}

/// Questions presented as one block: a single question or an item set.
type Unit = Vec<ExamQuestion>;

/// Selection state shared by every section of one exam.
struct Draw<'a, R> {
    config: &'a ExamTemplateConfig,
    percents: Vec<f64>,
    shares: [f64; 3],
    candidates: Vec<&'a CandidateQuestion>,
    by_id: HashMap<&'a str, &'a CandidateQuestion>,
    used: HashSet<&'a str>,
    rng: R,
    warnings: Vec<GenerationWarning>,
}

/// Exam generator parameterized by its random stream.
pub struct ExamGenerator<R: SeededRandom = Mulberry32> {
    _rng: PhantomData<fn() -> R>,
}

impl<R: SeededRandom> Default for ExamGenerator<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: SeededRandom> ExamGenerator<R> {
    pub fn new() -> Self {
        Self { _rng: PhantomData }
    }

    /// Build an exam from `config` by sampling `pool`.
    ///
    /// Identical `(config, pool, seed)` inputs always produce the same exam.
    /// Without a seed a random one is drawn and recorded on the exam.
    pub fn generate(
        &self,
        config: &ExamTemplateConfig,
        pool: &[CandidateQuestion],
        seed: Option<&str>,
    ) -> Result<GeneratedExam, ConfigurationError> {
        if config.total_questions == 0 {
            return Err(ConfigurationError::NoQuestionsRequested {
                template: config.id.clone(),
            });
        }
        if config.blueprint.is_empty() {
            return Err(ConfigurationError::NoBlueprintWeights {
                template: config.id.clone(),
            });
        }

        let seed = seed
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let weights = normalize_weights(&config.blueprint);
        let mut warnings = weights.warnings;

        if pool.is_empty() {
            tracing::warn!(template = %config.id, "question pool is empty");
            warnings.push(GenerationWarning::EmptyPool);
            return Ok(GeneratedExam {
                template: config.clone(),
                seed,
                questions: Vec::new(),
                warnings,
            });
        }

        let shares = difficulty_shares(&config.difficulty, &mut warnings);
        let candidates = dedupe_pool(pool, &mut warnings);
        let by_id = candidates.iter().map(|&q| (q.id.as_str(), q)).collect();
        let sections = plan_sections(config, &mut warnings);

        let mut draw = Draw {
            config,
            percents: weights.percents,
            shares,
            candidates,
            by_id,
            used: HashSet::new(),
            rng: R::from_seed(&seed),
            warnings,
        };

        let mut presentation = R::from_seed(&format!("{seed}/presentation"));
        let mut questions = Vec::new();
        for section in &sections {
            let mut units = draw.section(section);
            shuffle(&mut presentation, &mut units);
            questions.extend(units.into_iter().flatten());
        }
        let mut warnings = draw.warnings;

        let requested = config.requested_questions();
        let selected = questions.len() as u32;
        if selected < requested {
            tracing::warn!(
                template = %config.id,
                requested,
                selected,
                "pool exhausted before the exam was full"
            );
            warnings.push(GenerationWarning::PoolExhausted {
                requested,
                selected,
            });
        }

        tracing::debug!(
            template = %config.id,
            seed = %seed,
            selected,
            warnings = warnings.len(),
            "generated exam"
        );

        Ok(GeneratedExam {
            template: config.clone(),
            seed,
            questions,
            warnings,
        })
    }
}

/// Generate an exam with the default [`Mulberry32`] stream.
pub fn generate(
    config: &ExamTemplateConfig,
    pool: &[CandidateQuestion],
    seed: Option<&str>,
) -> Result<GeneratedExam, ConfigurationError> {
    ExamGenerator::<Mulberry32>::new().generate(config, pool, seed)
}

fn difficulty_shares(
    distribution: &DifficultyDistribution,
    warnings: &mut Vec<GenerationWarning>,
) -> [f64; 3] {
    let shares = distribution
        .shares()
        .map(|s| if s.is_finite() && s > 0.0 { s } else { 0.0 });
    if shares.iter().sum::<f64>() > 0.0 {
        shares
    } else {
        warnings.push(GenerationWarning::DifficultyFallback);
        [1.0; 3]
    }
}

/// Drop repeated ids, keeping the first copy and pool order.
fn dedupe_pool<'a>(
    pool: &'a [CandidateQuestion],
    warnings: &mut Vec<GenerationWarning>,
) -> Vec<&'a CandidateQuestion> {
    let mut seen = HashSet::new();
    pool.iter()
        .filter(|&question| {
            let first = seen.insert(question.id.as_str());
            if !first {
                tracing::debug!(id = %question.id, "duplicate question id in pool");
                warnings.push(GenerationWarning::DuplicateQuestion {
                    id: question.id.clone(),
                });
            }
            first
        })
        .collect()
}

/// Split the exam into sections and hand each item set to its section.
fn plan_sections<'t>(
    config: &'t ExamTemplateConfig,
    warnings: &mut Vec<GenerationWarning>,
) -> Vec<Section<'t>> {
    if config.testlets.is_empty() {
        return vec![Section {
            testlet: None,
            count: config.total_questions,
            item_sets: config.item_sets.iter().collect(),
        }];
    }

    let mut sections: Vec<Section<'t>> = config
        .testlets
        .iter()
        .map(|t| Section {
            testlet: Some(t),
            count: t.question_count,
            item_sets: Vec::new(),
        })
        .collect();
    for set in &config.item_sets {
        let target = set
            .testlet
            .as_deref()
            .and_then(|id| sections.iter_mut().find(|s| s.testlet_id() == Some(id)));
        match target {
            Some(section) => section.item_sets.push(set),
            None => {
                tracing::warn!(item_set = %set.id, "item set names no testlet of the template");
                warnings.push(GenerationWarning::ItemSetUnplaced {
                    item_set: set.id.clone(),
                });
            }
        }
    }
    sections
}

impl<'a, R: SeededRandom> Draw<'a, R> {
    fn area_index(&self, question: &CandidateQuestion) -> Option<usize> {
        let blueprint = &self.config.blueprint;
        resolve_area(&question.blueprint_area, blueprint)
            .and_then(|area| blueprint.iter().position(|w| w.area == area))
    }

    /// Fill one section: item sets first, then curated ids or a weighted
    /// draw for the remaining slots.
    fn section(&mut self, section: &Section<'_>) -> Vec<Unit> {
        let testlet = section.testlet_id();
        let mut units: Vec<Unit> = Vec::new();
        let mut pinned = vec![0u32; self.config.blueprint.len()];
        let mut placed = 0u32;

        for set in &section.item_sets {
            let members = self.curated(&set.question_ids);
            if members.is_empty() {
                continue;
            }
            let size = members.len() as u32;
            let room = section.count - placed;
            if size > room {
                tracing::warn!(item_set = %set.id, size, room, "item set does not fit");
                self.warnings.push(GenerationWarning::ItemSetSkipped {
                    item_set: set.id.clone(),
                    questions: size,
                    room,
                });
                continue;
            }
            placed += size;
            let mut unit = Vec::with_capacity(members.len());
            for (question, area) in members {
                self.used.insert(question.id.as_str());
                pinned[area] += 1;
                unit.push(self.slot(question, area, testlet, Some(&set.id)));
            }
            units.push(unit);
        }

        match section.testlet {
            Some(t) if t.is_curated() => {
                for (question, area) in self.curated(&t.question_ids) {
                    if placed == section.count {
                        break;
                    }
                    self.used.insert(question.id.as_str());
                    placed += 1;
                    units.push(vec![self.slot(question, area, testlet, None)]);
                }
            }
            _ => {
                let drawn = self.weighted(section, &pinned);
                placed += drawn.len() as u32;
                units.extend(drawn.into_iter().map(|q| vec![q]));
            }
        }

        if let Some(t) = section.testlet {
            if placed < section.count {
                tracing::warn!(
                    testlet = %t.id,
                    requested = section.count,
                    selected = placed,
                    "testlet short of questions"
                );
                self.warnings.push(GenerationWarning::TestletShortfall {
                    testlet: t.id.clone(),
                    requested: section.count,
                    selected: placed,
                });
            }
        }

        units
    }

    /// Look up curated ids in order. Ids missing from the pool, outside the
    /// blueprint, or already placed are skipped with a warning.
    fn curated(&mut self, ids: &[String]) -> Vec<(&'a CandidateQuestion, usize)> {
        let mut members = Vec::new();
        let mut listed = HashSet::new();
        for id in ids {
            let found = self
                .by_id
                .get(id.as_str())
                .copied()
                .and_then(|q| self.area_index(q).map(|area| (q, area)));
            match found {
                None => {
                    tracing::warn!(id = %id, "curated question not available");
                    self.warnings
                        .push(GenerationWarning::MissingQuestion { id: id.clone() });
                }
                Some((q, _)) if self.used.contains(q.id.as_str()) || !listed.insert(id) => {
                    tracing::warn!(id = %id, "curated question already placed");
                    self.warnings
                        .push(GenerationWarning::QuestionReused { id: id.clone() });
                }
                Some(member) => members.push(member),
            }
        }
        members
    }

    fn slot(
        &self,
        question: &CandidateQuestion,
        area: usize,
        testlet: Option<&str>,
        item_set: Option<&str>,
    ) -> ExamQuestion {
        ExamQuestion::from_candidate(
            question,
            &self.config.blueprint[area].area,
            testlet,
            item_set,
        )
    }

    /// Blueprint-weighted draw for the slots of a section that item sets
    /// did not take. `pinned` counts item-set questions per area.
    fn weighted(&mut self, section: &Section<'_>, pinned: &[u32]) -> Vec<ExamQuestion> {
        let config = self.config;
        let blueprint = &config.blueprint;
        let testlet = section.testlet;

        let areas: Vec<usize> = (0..blueprint.len())
            .filter(|&i| {
                pinned[i] > 0 || testlet.map_or(true, |t| t.covers_area(&blueprint[i].area))
            })
            .collect();
        if areas.is_empty() {
            return Vec::new();
        }

        let percents: Vec<f64> = if areas.len() == blueprint.len() {
            self.percents.clone()
        } else {
            let subset: Vec<f64> = areas.iter().map(|&i| self.percents[i]).collect();
            let sum: f64 = subset.iter().sum();
            if sum > 0.0 {
                subset.iter().map(|p| p * 100.0 / sum).collect()
            } else {
                vec![100.0 / subset.len() as f64; subset.len()]
            }
        };

        // Stated bounds are exam-wide, so they apply to a flat draw only.
        let bounds: Vec<(u32, u32)> = areas
            .iter()
            .map(|&i| match testlet {
                None => (
                    blueprint[i].min_questions.unwrap_or(0),
                    blueprint[i].max_questions.unwrap_or(u32::MAX),
                ),
                Some(_) => (0, u32::MAX),
            })
            .collect();
        let area_pinned: Vec<u32> = areas.iter().map(|&i| pinned[i]).collect();

        let mut pools: Vec<AreaPool<'a>> = vec![AreaPool::default(); areas.len()];
        for &question in &self.candidates {
            if self.used.contains(question.id.as_str())
                || testlet.is_some_and(|t| !t.admits(question))
            {
                continue;
            }
            let Some(k) = self
                .area_index(question)
                .and_then(|i| areas.iter().position(|&a| a == i))
            else {
                continue;
            };
            pools[k].tiers[question.difficulty.index()].push(question);
        }

        let available: Vec<u32> = pools
            .iter()
            .zip(&area_pinned)
            .map(|(p, &fixed)| p.available() + fixed)
            .collect();
        let weights: Vec<&BlueprintWeight> = areas.iter().map(|&i| &blueprint[i]).collect();
        let counts = allocate_areas(
            &weights,
            &percents,
            section.count,
            &bounds,
            &area_pinned,
            &available,
            &mut self.warnings,
        );

        let shares = match testlet {
            Some(t) if !t.difficulties.is_empty() => {
                let allowed = |d: Difficulty| t.difficulties.contains(&d);
                let masked =
                    Difficulty::ALL.map(|d| if allowed(d) { self.shares[d.index()] } else { 0.0 });
                if masked.iter().sum::<f64>() > 0.0 {
                    masked
                } else {
                    Difficulty::ALL.map(|d| if allowed(d) { 1.0 } else { 0.0 })
                }
            }
            _ => self.shares,
        };

        let mut selected = Vec::new();
        for (k, &count) in counts.iter().enumerate() {
            let free = count.saturating_sub(area_pinned[k]);
            for question in select_area(
                &mut self.rng,
                &weights[k].area,
                &shares,
                &pools[k],
                free,
                &mut self.warnings,
            ) {
                self.used.insert(question.id.as_str());
                selected.push(self.slot(question, areas[k], section.testlet_id(), None));
            }
        }
        selected
    }
}

fn sum(counts: &[u32]) -> u64 {
    counts.iter().map(|&c| u64::from(c)).sum()
}

/// Decide how many questions each area contributes to a section of
/// `total` questions. `pinned` questions are already placed and count
/// toward their area.
fn allocate_areas(
    areas: &[&BlueprintWeight],
    percents: &[f64],
    total: u32,
    bounds: &[(u32, u32)],
    pinned: &[u32],
    available: &[u32],
    warnings: &mut Vec<GenerationWarning>,
) -> Vec<u32> {
    let quotas: Vec<f64> = percents
        .iter()
        .map(|p| p * f64::from(total) / 100.0)
        .collect();

    let upper: Vec<u32> = bounds
        .iter()
        .zip(pinned)
        .map(|(&(_, max), &fixed)| max.max(fixed))
        .collect();
    let lower: Vec<u32> = bounds
        .iter()
        .zip(&upper)
        .zip(pinned)
        .map(|((&(min, _), &max), &fixed)| min.min(max).min(total).max(fixed))
        .collect();

    let mut counts: Vec<u32> = largest_remainder(total, percents)
        .into_iter()
        .enumerate()
        .map(|(i, c)| c.clamp(lower[i], upper[i]))
        .collect();
    rebalance(&mut counts, &quotas, total, &lower, &upper);
    if sum(&counts) > u64::from(total) {
        tracing::warn!(total, "area minimums exceed the exam size, relaxing them");
        rebalance(&mut counts, &quotas, total, pinned, &upper);
    }

    for (i, weight) in areas.iter().enumerate() {
        if counts[i] > available[i] {
            tracing::warn!(
                area = %weight.area,
                requested = counts[i],
                available = available[i],
                "blueprint area short of candidates"
            );
            warnings.push(GenerationWarning::AreaShortfall {
                area: weight.area.clone(),
                requested: counts[i],
                available: available[i],
            });
            counts[i] = available[i];
        }
    }

    // Cross-area backfill: stated maximums are honored on the first pass
    // and relaxed on the second.
    let mut extra = vec![0u32; counts.len()];
    for honor_max in [true, false] {
        let caps: Vec<u32> = available
            .iter()
            .zip(&upper)
            .map(|(&avail, &max)| if honor_max { avail.min(max) } else { avail })
            .collect();
        while sum(&counts) < u64::from(total) {
            let Some(i) = most_underserved(&counts, &quotas, &caps) else {
                break;
            };
            counts[i] += 1;
            extra[i] += 1;
        }
    }

    for (i, &added) in extra.iter().enumerate() {
        if added > 0 {
            let area = &areas[i].area;
            tracing::warn!(area = %area, extra = added, "backfilled area");
            warnings.push(GenerationWarning::Backfilled {
                area: area.clone(),
                extra: added,
            });
        }
    }

    counts
}

/// Move counts toward `total` one question at a time while staying within
/// `[lower, upper]`.
fn rebalance(counts: &mut [u32], quotas: &[f64], total: u32, lower: &[u32], upper: &[u32]) {
    let total = u64::from(total);
    loop {
        let current = sum(counts);
        let step = if current < total {
            most_underserved(counts, quotas, upper).map(|i| (i, true))
        } else if current > total {
            most_overserved(counts, quotas, lower).map(|i| (i, false))
        } else {
            None
        };
        match step {
            Some((i, true)) => counts[i] += 1,
            Some((i, false)) => counts[i] -= 1,
            None => break,
        }
    }
}

/// Area furthest below its quota that can still grow. Ties go to the
/// earlier area.
fn most_underserved(counts: &[u32], quotas: &[f64], caps: &[u32]) -> Option<usize> {
    (0..counts.len())
        .filter(|&i| counts[i] < caps[i])
        .max_by(|&a, &b| {
            let da = quotas[a] - f64::from(counts[a]);
            let db = quotas[b] - f64::from(counts[b]);
            da.total_cmp(&db).then(b.cmp(&a))
        })
}

/// Area furthest above its quota that can still shrink. Ties go to the
/// later area.
fn most_overserved(counts: &[u32], quotas: &[f64], floors: &[u32]) -> Option<usize> {
    (0..counts.len())
        .filter(|&i| counts[i] > floors[i])
        .max_by(|&a, &b| {
            let ea = f64::from(counts[a]) - quotas[a];
            let eb = f64::from(counts[b]) - quotas[b];
            ea.total_cmp(&eb).then(a.cmp(&b))
        })
}

/// Draw `count` questions from one area following the difficulty mix.
///
/// `count` never exceeds the area's availability, so tier shortfalls can
/// always be covered by neighboring tiers.
fn select_area<'a, R: SeededRandom>(
    rng: &mut R,
    area: &str,
    shares: &[f64; 3],
    pool: &AreaPool<'a>,
    count: u32,
    warnings: &mut Vec<GenerationWarning>,
) -> Vec<&'a CandidateQuestion> {
    if count == 0 {
        return Vec::new();
    }

    let wanted = largest_remainder(count, shares);
    let mut remaining = pool.tiers.clone();
    for tier in remaining.iter_mut() {
        shuffle(rng, tier);
    }

    let mut selected = Vec::with_capacity(count as usize);
    let mut short = [0u32; 3];
    for difficulty in Difficulty::ALL {
        let t = difficulty.index();
        let available = remaining[t].len() as u32;
        let take = wanted[t].min(available);
        selected.extend(remaining[t].drain(..take as usize));
        if take < wanted[t] {
            short[t] = wanted[t] - take;
            tracing::debug!(
                area = %area,
                %difficulty,
                requested = wanted[t],
                available,
                "difficulty tier short of candidates"
            );
            warnings.push(GenerationWarning::DifficultyShortfall {
                area: area.to_string(),
                difficulty,
                requested: wanted[t],
                available,
            });
        }
    }

    for difficulty in Difficulty::ALL {
        let mut missing = short[difficulty.index()];
        for neighbor in difficulty.neighbors() {
            if missing == 0 {
                break;
            }
            let n = neighbor.index();
            let take = missing.min(remaining[n].len() as u32);
            selected.extend(remaining[n].drain(..take as usize));
            missing -= take;
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionPayload;
    use crate::random::StdRandom;
    use crate::scale::ScoreScale;

    fn question(id: &str, area: &str, difficulty: Difficulty) -> CandidateQuestion {
        CandidateQuestion {
            id: id.into(),
            blueprint_area: area.into(),
            topic: format!("{area} topic"),
            difficulty,
            payload: QuestionPayload {
                prompt: format!("Question {id}"),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_option: 0,
                explanation: String::new(),
            },
        }
    }

    /// `count` questions for `area`, cycling through the tiers.
    fn area_questions(area: &str, count: usize) -> Vec<CandidateQuestion> {
        (0..count)
            .map(|i| question(&format!("{area}-{i:03}"), area, Difficulty::ALL[i % 3]))
            .collect()
    }

    fn template(total: u32, weights: &[(&str, f64)]) -> ExamTemplateConfig {
        ExamTemplateConfig {
            id: "test-template".into(),
            name: "Test Template".into(),
            certification: "TEST".into(),
            section: "T".into(),
            total_questions: total,
            time_limit_minutes: 60,
            passing_score: 75.0,
            blueprint: weights
                .iter()
                .map(|(a, w)| BlueprintWeight::new(*a, *w))
                .collect(),
            difficulty: DifficultyDistribution::default(),
            scale: ScoreScale::Percent,
            testlets: Vec::new(),
            item_sets: Vec::new(),
        }
    }

    #[test]
    fn balanced_pool_meets_weights_without_warnings() {
        let config = template(10, &[("A", 50.0), ("B", 50.0)]);
        let mut pool = area_questions("A", 20);
        pool.extend(area_questions("B", 20));

        let exam = generate(&config, &pool, Some("seed-1")).unwrap();

        assert_eq!(exam.len(), 10);
        let counts = exam.count_by_area();
        assert_eq!(counts.get("A"), Some(&5));
        assert_eq!(counts.get("B"), Some(&5));
        assert!(exam.warnings.is_empty(), "unexpected: {:?}", exam.warnings);
    }

    #[test]
    fn shortfall_backfills_from_other_area_and_warns() {
        let config = template(10, &[("A", 50.0), ("B", 50.0)]);
        let mut pool = area_questions("A", 20);
        pool.extend(area_questions("B", 2));

        let exam = generate(&config, &pool, Some("seed-2")).unwrap();

        assert_eq!(exam.len(), 10);
        let counts = exam.count_by_area();
        assert_eq!(counts.get("A"), Some(&8));
        assert_eq!(counts.get("B"), Some(&2));
        assert!(exam.warnings.iter().any(|w| matches!(
            w,
            GenerationWarning::AreaShortfall { area, requested: 5, available: 2 } if area == "B"
        )));
        assert!(exam
            .warnings
            .contains(&GenerationWarning::Backfilled { area: "A".into(), extra: 3 }));
    }

    #[test]
    fn same_seed_same_exam() {
        let config = template(12, &[("A", 40.0), ("B", 35.0), ("C", 25.0)]);
        let mut pool = area_questions("A", 30);
        pool.extend(area_questions("B", 30));
        pool.extend(area_questions("C", 30));

        let first = generate(&config, &pool, Some("repeatable")).unwrap();
        let second = generate(&config, &pool, Some("repeatable")).unwrap();
        assert_eq!(first, second);

        let other = generate(&config, &pool, Some("different")).unwrap();
        assert_ne!(first.question_ids(), other.question_ids());
    }

    #[test]
    fn no_duplicate_ids_even_with_duplicated_pool_entries() {
        let config = template(9, &[("A", 100.0)]);
        let mut pool = area_questions("A", 9);
        pool.extend(area_questions("A", 9));

        let exam = generate(&config, &pool, Some("dupes")).unwrap();

        let ids: HashSet<&str> = exam.question_ids().into_iter().collect();
        assert_eq!(ids.len(), exam.len());
        assert_eq!(exam.len(), 9);
        assert_eq!(
            exam.warnings
                .iter()
                .filter(|w| matches!(w, GenerationWarning::DuplicateQuestion { .. }))
                .count(),
            9
        );
    }

    #[test]
    fn empty_pool_yields_empty_exam_with_warning() {
        let config = template(10, &[("A", 100.0)]);
        let exam = generate(&config, &[], Some("empty")).unwrap();
        assert!(exam.is_empty());
        assert!(exam.warnings.contains(&GenerationWarning::EmptyPool));
    }

    #[test]
    fn request_larger_than_pool_degrades() {
        let config = template(50, &[("A", 60.0), ("B", 40.0)]);
        let mut pool = area_questions("A", 10);
        pool.extend(area_questions("B", 5));

        let exam = generate(&config, &pool, Some("big")).unwrap();

        assert_eq!(exam.len(), 15);
        assert!(exam.warnings.contains(&GenerationWarning::PoolExhausted {
            requested: 50,
            selected: 15
        }));
    }

    #[test]
    fn huge_request_returns_the_whole_pool() {
        let config = template(u32::MAX, &[("A", 60.0), ("B", 40.0)]);
        let mut pool = area_questions("A", 5);
        pool.extend(area_questions("B", 5));

        let exam = generate(&config, &pool, Some("huge")).unwrap();

        assert_eq!(exam.len(), 10);
        assert!(exam.warnings.contains(&GenerationWarning::PoolExhausted {
            requested: u32::MAX,
            selected: 10
        }));
    }

    #[test]
    fn oversized_minimums_shrink_to_exam_size() {
        let mut config = template(10, &[("A", 50.0), ("B", 50.0)]);
        config.blueprint[0].min_questions = Some(u32::MAX);
        config.blueprint[1].min_questions = Some(u32::MAX);
        let mut pool = area_questions("A", 20);
        pool.extend(area_questions("B", 20));

        let exam = generate(&config, &pool, Some("mins")).unwrap();

        assert_eq!(exam.len(), 10);
        let counts = exam.count_by_area();
        assert_eq!(counts.get("A"), Some(&5));
        assert_eq!(counts.get("B"), Some(&5));
    }

    #[test]
    fn zero_total_is_a_configuration_error() {
        let config = template(0, &[("A", 100.0)]);
        let err = generate(&config, &area_questions("A", 5), None).unwrap_err();
        assert!(matches!(err, ConfigurationError::NoQuestionsRequested { .. }));
    }

    #[test]
    fn missing_blueprint_is_a_configuration_error() {
        let config = template(10, &[]);
        let err = generate(&config, &area_questions("A", 5), None).unwrap_err();
        assert!(matches!(err, ConfigurationError::NoBlueprintWeights { .. }));
    }

    #[test]
    fn unnormalized_weights_are_rescaled_with_warning() {
        let config = template(8, &[("A", 3.0), ("B", 1.0)]);
        let mut pool = area_questions("A", 20);
        pool.extend(area_questions("B", 20));

        let exam = generate(&config, &pool, Some("norm")).unwrap();

        let counts = exam.count_by_area();
        assert_eq!(counts.get("A"), Some(&6));
        assert_eq!(counts.get("B"), Some(&2));
        assert!(exam
            .warnings
            .iter()
            .any(|w| matches!(w, GenerationWarning::WeightsNormalized { .. })));
    }

    #[test]
    fn counts_stay_within_one_of_rounded_weight() {
        let weights = [
            ("RET", 18.0),
            ("INV", 17.0),
            ("GEN", 15.0),
            ("TAX", 14.0),
            ("RIS", 11.0),
            ("EST", 10.0),
            ("PRO", 8.0),
            ("PSY", 7.0),
        ];
        let config = template(50, &weights);
        let pool: Vec<CandidateQuestion> = weights
            .iter()
            .flat_map(|(area, _)| area_questions(area, 30))
            .collect();

        let exam = generate(&config, &pool, Some("cfp-mini")).unwrap();

        assert_eq!(exam.len(), 50);
        let counts = exam.count_by_area();
        for (area, weight) in weights {
            let target = (weight / 100.0 * 50.0_f64).round() as i64;
            let actual = counts.get(area).copied().unwrap_or(0) as i64;
            assert!((actual - target).abs() <= 1, "{area}: {actual} vs {target}");
        }
    }

    #[test]
    fn difficulty_mix_follows_distribution() {
        let mut config = template(10, &[("A", 100.0)]);
        config.difficulty = DifficultyDistribution::new(20.0, 50.0, 30.0);
        let pool = area_questions("A", 30);

        let exam = generate(&config, &pool, Some("mix")).unwrap();

        let by_tier = exam.count_by_difficulty();
        assert_eq!(by_tier.get(&Difficulty::Easy), Some(&2));
        assert_eq!(by_tier.get(&Difficulty::Medium), Some(&5));
        assert_eq!(by_tier.get(&Difficulty::Hard), Some(&3));
    }

    #[test]
    fn missing_tier_backfills_within_area() {
        let mut config = template(6, &[("A", 100.0)]);
        config.difficulty = DifficultyDistribution::new(0.0, 50.0, 50.0);
        let pool: Vec<CandidateQuestion> = (0..10)
            .map(|i| {
                let tier = if i < 8 { Difficulty::Medium } else { Difficulty::Easy };
                question(&format!("A-{i}"), "A", tier)
            })
            .collect();

        let exam = generate(&config, &pool, Some("tiers")).unwrap();

        assert_eq!(exam.len(), 6);
        assert_eq!(exam.count_by_difficulty().get(&Difficulty::Medium), Some(&6));
        assert!(exam.warnings.iter().any(|w| matches!(
            w,
            GenerationWarning::DifficultyShortfall { difficulty: Difficulty::Hard, requested: 3, available: 0, .. }
        )));
    }

    #[test]
    fn min_and_max_bounds_are_respected() {
        let mut config = template(10, &[("A", 90.0), ("B", 10.0)]);
        config.blueprint[0].max_questions = Some(6);
        config.blueprint[1].min_questions = Some(3);
        let mut pool = area_questions("A", 20);
        pool.extend(area_questions("B", 20));

        let exam = generate(&config, &pool, Some("bounds")).unwrap();

        let counts = exam.count_by_area();
        assert_eq!(counts.get("A"), Some(&6));
        assert_eq!(counts.get("B"), Some(&4));
        assert_eq!(exam.len(), 10);
    }

    #[test]
    fn specific_tags_resolve_to_template_area() {
        let config = template(4, &[("FAR-I", 50.0), ("FAR-III", 50.0)]);
        let pool = vec![
            question("q1", "FAR-I-A-1", Difficulty::Medium),
            question("q2", "FAR-I-B-2", Difficulty::Easy),
            question("q3", "FAR-III-E-3", Difficulty::Hard),
            question("q4", "FAR-III-A-1", Difficulty::Medium),
            question("q5", "FAR-II-A-1", Difficulty::Medium),
        ];

        let exam = generate(&config, &pool, Some("tags")).unwrap();

        assert_eq!(exam.len(), 4);
        assert!(!exam.question_ids().contains(&"q5"));
        let far_three: Vec<&ExamQuestion> = exam
            .questions
            .iter()
            .filter(|q| q.blueprint_area == "FAR-III")
            .collect();
        assert_eq!(far_three.len(), 2);
    }

    #[test]
    fn unseeded_exam_records_its_seed() {
        let config = template(5, &[("A", 100.0)]);
        let pool = area_questions("A", 15);

        let exam = generate(&config, &pool, None).unwrap();
        let replay = generate(&config, &pool, Some(&exam.seed)).unwrap();

        assert!(!exam.seed.is_empty());
        assert_eq!(exam.question_ids(), replay.question_ids());
    }

    #[test]
    fn alternate_random_stream_is_also_deterministic() {
        let config = template(10, &[("A", 50.0), ("B", 50.0)]);
        let mut pool = area_questions("A", 20);
        pool.extend(area_questions("B", 20));

        let generator = ExamGenerator::<StdRandom>::new();
        let first = generator.generate(&config, &pool, Some("std")).unwrap();
        let second = generator.generate(&config, &pool, Some("std")).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
    }

    fn far_mock() -> (ExamTemplateConfig, Vec<CandidateQuestion>) {
        let mut config = template(10, &[("FAR-I", 50.0), ("FAR-II", 50.0)]);
        let mut first = TestletConfig::new("t1", 4);
        first.areas = vec!["FAR-I".into()];
        first.difficulties = vec![Difficulty::Easy, Difficulty::Medium];
        config.testlets = vec![first, TestletConfig::new("t2", 6)];
        let mut pool = area_questions("FAR-I", 12);
        pool.extend(area_questions("FAR-II", 12));
        (config, pool)
    }

    fn item_set(id: &str, ids: &[&str], testlet: Option<&str>) -> ItemSet {
        ItemSet {
            id: id.into(),
            title: String::new(),
            scenario: String::new(),
            question_ids: ids.iter().map(|s| s.to_string()).collect(),
            testlet: testlet.map(str::to_string),
        }
    }

    #[test]
    fn testlets_keep_order_and_filters() {
        let (config, pool) = far_mock();

        let exam = generate(&config, &pool, Some("far-mock")).unwrap();

        assert_eq!(exam.len(), 10);
        let order: Vec<&str> = exam
            .questions
            .iter()
            .map(|q| q.testlet.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(order, ["t1", "t1", "t1", "t1", "t2", "t2", "t2", "t2", "t2", "t2"]);
        for q in exam.testlet_questions("t1") {
            assert_eq!(q.blueprint_area, "FAR-I");
            assert_ne!(q.difficulty, Difficulty::Hard);
        }
        let ids: HashSet<&str> = exam.question_ids().into_iter().collect();
        assert_eq!(ids.len(), 10);
        assert!(!exam
            .warnings
            .iter()
            .any(|w| matches!(w, GenerationWarning::TestletShortfall { .. })));

        let replay = generate(&config, &pool, Some("far-mock")).unwrap();
        assert_eq!(exam, replay);
    }

    #[test]
    fn curated_testlets_skip_missing_and_reused_ids() {
        let (mut config, pool) = far_mock();
        config.testlets[0].question_ids =
            vec!["FAR-II-001".into(), "nope".into(), "FAR-I-002".into()];
        config.testlets[0].question_count = 3;
        config.testlets[1].question_ids = vec!["FAR-I-002".into(), "FAR-I-005".into()];
        config.testlets[1].question_count = 2;
        config.total_questions = 5;

        let exam = generate(&config, &pool, Some("curated")).unwrap();

        let mut first: Vec<&str> = exam
            .testlet_questions("t1")
            .into_iter()
            .map(|q| q.id.as_str())
            .collect();
        first.sort_unstable();
        assert_eq!(first, ["FAR-I-002", "FAR-II-001"]);
        let second: Vec<&str> = exam
            .testlet_questions("t2")
            .into_iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(second, ["FAR-I-005"]);

        assert!(exam
            .warnings
            .contains(&GenerationWarning::MissingQuestion { id: "nope".into() }));
        assert!(exam
            .warnings
            .contains(&GenerationWarning::QuestionReused { id: "FAR-I-002".into() }));
        assert!(exam.warnings.contains(&GenerationWarning::TestletShortfall {
            testlet: "t1".into(),
            requested: 3,
            selected: 2
        }));
        assert!(exam.warnings.contains(&GenerationWarning::PoolExhausted {
            requested: 5,
            selected: 3
        }));
    }

    #[test]
    fn item_sets_stay_together_in_listed_order() {
        let mut config = template(10, &[("A", 50.0), ("B", 50.0)]);
        config.item_sets = vec![item_set("case", &["B-002", "B-000", "B-001"], None)];
        let mut pool = area_questions("A", 20);
        pool.extend(area_questions("B", 20));

        for seed in ["s1", "s2", "s3", "s4"] {
            let exam = generate(&config, &pool, Some(seed)).unwrap();

            assert_eq!(exam.len(), 10);
            let start = exam
                .questions
                .iter()
                .position(|q| q.item_set.is_some())
                .unwrap();
            let block: Vec<&str> = exam.questions[start..start + 3]
                .iter()
                .map(|q| q.id.as_str())
                .collect();
            assert_eq!(block, ["B-002", "B-000", "B-001"], "seed {seed}");
            assert_eq!(
                exam.questions.iter().filter(|q| q.item_set.is_some()).count(),
                3
            );
            assert_eq!(exam.count_by_area().get("B"), Some(&5));
        }
    }

    #[test]
    fn item_sets_that_cannot_be_placed_are_reported() {
        let (mut config, pool) = far_mock();
        config.item_sets = vec![
            item_set(
                "big",
                &["FAR-I-000", "FAR-I-001", "FAR-I-002", "FAR-I-003", "FAR-I-004"],
                Some("t1"),
            ),
            item_set("lease", &["FAR-II-000", "FAR-II-001"], Some("t2")),
            item_set("stray", &["FAR-II-002"], Some("t9")),
        ];

        let exam = generate(&config, &pool, Some("sets")).unwrap();

        assert_eq!(exam.len(), 10);
        assert!(exam.warnings.contains(&GenerationWarning::ItemSetSkipped {
            item_set: "big".into(),
            questions: 5,
            room: 4
        }));
        assert!(exam.warnings.contains(&GenerationWarning::ItemSetUnplaced {
            item_set: "stray".into()
        }));
        assert!(exam
            .testlet_questions("t1")
            .iter()
            .all(|q| q.item_set.is_none()));
        let lease: Vec<&ExamQuestion> = exam
            .questions
            .iter()
            .filter(|q| q.item_set.as_deref() == Some("lease"))
            .collect();
        assert_eq!(lease.len(), 2);
        assert!(lease.iter().all(|q| q.testlet.as_deref() == Some("t2")));
    }

    #[test]
    fn warning_display_names_area() {
        let warning = GenerationWarning::AreaShortfall {
            area: "B".into(),
            requested: 5,
            available: 2,
        };
        assert_eq!(warning.area(), Some("B"));
        assert_eq!(
            warning.to_string(),
            "area B: requested 5 questions but only 2 available"
        );
    }
}
