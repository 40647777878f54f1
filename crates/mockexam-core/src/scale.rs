//! Raw-percent to reporting-scale transforms.
//!
//! Every certification reports on its own scale (0-99, 250-750, 0-500, ...).
//! The mapping is supplied with the exam template rather than hard-coded.

use serde::{Deserialize, Serialize};

/// Maps a raw percent-correct (0-100) onto a reporting scale.
pub trait ScaleTransform {
    /// Transform a raw percentage.
    fn scale(&self, raw_percent: f64) -> f64;

    /// Lowest and highest reportable scores.
    fn bounds(&self) -> (f64, f64);
}

/// One anchor of a table-driven scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalePoint {
    /// Raw percent correct.
    pub raw: f64,
    /// Reported score at that raw percent.
    pub scaled: f64,
}

/// Scale transform carried by an exam template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoreScale {
    /// Report the raw percentage unchanged.
    #[default]
    Percent,
    /// Map 0-100 linearly onto `[min, max]`.
    Linear { min: f64, max: f64 },
    /// Piecewise-linear interpolation between anchors, clamped at both ends.
    Table { points: Vec<ScalePoint> },
}

impl ScoreScale {
    fn sorted_points(points: &[ScalePoint]) -> Vec<ScalePoint> {
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.raw.total_cmp(&b.raw));
        sorted
    }
}

impl ScaleTransform for ScoreScale {
    fn scale(&self, raw_percent: f64) -> f64 {
        let raw = raw_percent.clamp(0.0, 100.0);
        match self {
            ScoreScale::Percent => raw,
            ScoreScale::Linear { min, max } => min + (max - min) * raw / 100.0,
            ScoreScale::Table { points } => {
                let points = Self::sorted_points(points);
                let (Some(first), Some(last)) = (points.first(), points.last()) else {
                    return raw;
                };
                if raw <= first.raw {
                    return first.scaled;
                }
                if raw >= last.raw {
                    return last.scaled;
                }
                for pair in points.windows(2) {
                    let (lo, hi) = (pair[0], pair[1]);
                    if raw <= hi.raw {
                        let span = hi.raw - lo.raw;
                        if span <= f64::EPSILON {
                            return hi.scaled;
                        }
                        return lo.scaled + (hi.scaled - lo.scaled) * (raw - lo.raw) / span;
                    }
                }
                last.scaled
            }
        }
    }

    fn bounds(&self) -> (f64, f64) {
        match self {
            ScoreScale::Percent => (0.0, 100.0),
            ScoreScale::Linear { min, max } => (min.min(*max), min.max(*max)),
            ScoreScale::Table { points } => {
                if points.is_empty() {
                    return (0.0, 100.0);
                }
                points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                    (lo.min(p.scaled), hi.max(p.scaled))
                })
            }
        }
    }
}
