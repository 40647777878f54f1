//! Blueprint weight helpers shared by the generator and the scorer.

use crate::generator::GenerationWarning;
use crate::model::BlueprintWeight;

/// Allowed drift of a template's weight sum from 100 before it is reported.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1.0;

/// Normalized blueprint weights, in template order, summing to 100.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedWeights {
    pub percents: Vec<f64>,
    pub warnings: Vec<GenerationWarning>,
}

impl NormalizedWeights {
    /// Normalized percent for the area at `index`.
    pub fn percent(&self, index: usize) -> f64 {
        self.percents.get(index).copied().unwrap_or(0.0)
    }
}

/// Rescale blueprint weights so they sum to exactly 100.
///
/// Negative or non-finite weights count as 0. When every weight is 0 the
/// areas share the exam equally.
pub fn normalize_weights(blueprint: &[BlueprintWeight]) -> NormalizedWeights {
    let mut warnings = Vec::new();

    let cleaned: Vec<f64> = blueprint
        .iter()
        .map(|w| {
            if w.weight.is_finite() && w.weight >= 0.0 {
                w.weight
            } else {
                warnings.push(GenerationWarning::InvalidWeight {
                    area: w.area.clone(),
                    weight: w.weight,
                });
                0.0
            }
        })
        .collect();

    if cleaned.is_empty() {
        return NormalizedWeights {
            percents: Vec::new(),
            warnings,
        };
    }

    let sum: f64 = cleaned.iter().sum();
    if sum <= 0.0 {
        warnings.push(GenerationWarning::EqualWeightsFallback);
        let equal = 100.0 / cleaned.len() as f64;
        return NormalizedWeights {
            percents: vec![equal; cleaned.len()],
            warnings,
        };
    }

    if (sum - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
        warnings.push(GenerationWarning::WeightsNormalized { original_sum: sum });
    }

    NormalizedWeights {
        percents: cleaned.iter().map(|w| w * 100.0 / sum).collect(),
        warnings,
    }
}

/// Split `total` into integer parts proportional to `weights` using the
/// largest-remainder method.
///
/// The parts sum to `total` whenever any weight is positive; otherwise all
/// parts are 0. Remainder ties go to the earlier index.
pub fn largest_remainder(total: u32, weights: &[f64]) -> Vec<u32> {
    let cleaned: Vec<f64> = weights
        .iter()
        .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
        .collect();
    let sum: f64 = cleaned.iter().sum();
    if sum <= 0.0 || total == 0 {
        return vec![0; cleaned.len()];
    }

    let quotas: Vec<f64> = cleaned
        .iter()
        .map(|w| f64::from(total) * w / sum)
        .collect();
    let mut parts: Vec<u32> = quotas.iter().map(|q| q.floor() as u32).collect();
    let assigned: u64 = parts.iter().map(|&p| u64::from(p)).sum();
    let leftover = u64::from(total).saturating_sub(assigned) as usize;

    let mut order: Vec<usize> = (0..quotas.len()).filter(|&i| cleaned[i] > 0.0).collect();
    order.sort_by(|&a, &b| {
        let ra = quotas[a] - quotas[a].floor();
        let rb = quotas[b] - quotas[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    for &i in order.iter().cycle().take(leftover) {
        parts[i] += 1;
    }

    parts
}

/// Whether `tag` names `area` or one of its subdivisions.
///
/// "FAR-III-E-3" is within "FAR-III" but not within "FAR-I".
pub fn tag_in_area(tag: &str, area: &str) -> bool {
    tag == area
        || tag
            .strip_prefix(area)
            .is_some_and(|rest| rest.starts_with('-'))
}

/// Resolve a question's area tag to a template area.
///
/// The longest area containing the tag wins (see [`tag_in_area`]).
pub fn resolve_area<'a>(tag: &str, areas: &'a [BlueprintWeight]) -> Option<&'a str> {
    areas
        .iter()
        .map(|w| w.area.as_str())
        .filter(|area| tag_in_area(tag, area))
        .max_by_key(|area| area.len())
}
