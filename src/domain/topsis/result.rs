//! Calculation outputs: ideal solutions and per-entity results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::IndicatorCode;

/// Score assigned when both distances are zero and nothing discriminates.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Per-indicator best and worst vectors derived from one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdealSolution {
    pub positive_ideal: BTreeMap<IndicatorCode, f64>,
    pub negative_ideal: BTreeMap<IndicatorCode, f64>,
}

impl IdealSolution {
    /// Indicators whose positive and negative ideal coincide.
    pub fn non_discriminating(&self) -> Vec<IndicatorCode> {
        self.positive_ideal
            .iter()
            .filter(|(code, best)| {
                self.negative_ideal
                    .get(*code)
                    .is_some_and(|worst| worst == *best)
            })
            .map(|(code, _)| code.clone())
            .collect()
    }
}

/// Distances and closeness score of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityResult {
    pub positive_distance: f64,
    pub negative_distance: f64,
    pub comprehensive_score: f64,
    /// Configured indicators the entity had no finite value for. They are
    /// left out of both distances rather than counted as zero.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_indicators: Vec<IndicatorCode>,
}

impl EntityResult {
    /// Result with the score derived from the distances.
    pub fn from_distances(positive_distance: f64, negative_distance: f64) -> Self {
        Self {
            positive_distance,
            negative_distance,
            comprehensive_score: closeness(positive_distance, negative_distance),
            missing_indicators: Vec::new(),
        }
    }

    pub fn with_missing_indicators(mut self, missing: Vec<IndicatorCode>) -> Self {
        self.missing_indicators = missing;
        self
    }

    /// False when some configured indicator was left out of the distances.
    pub fn is_complete(&self) -> bool {
        self.missing_indicators.is_empty()
    }
}

/// `negative / (positive + negative)`, or [`NEUTRAL_SCORE`] when both are zero.
///
/// For finite non-negative inputs the result is always within `[0, 1]`.
pub fn closeness(positive_distance: f64, negative_distance: f64) -> f64 {
    let total = positive_distance + negative_distance;
    if total == 0.0 {
        NEUTRAL_SCORE
    } else if total.is_finite() {
        negative_distance / total
    } else {
        // Sum overflowed; halving keeps finite inputs finite.
        let half_negative = negative_distance / 2.0;
        half_negative / (positive_distance / 2.0 + half_negative)
    }
}
