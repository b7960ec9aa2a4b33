//! Distribution summary over a set of values.

use serde::{Deserialize, Serialize};

/// Count, extremes, mean and spread of finite values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub sum: f64,
    pub range: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl DistributionStats {
    /// Summarises the finite values; non-finite ones are skipped.
    /// Returns `None` when no finite value remains.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }

        let count = finite.len();
        let sum: f64 = finite.iter().sum();
        let mean = sum / count as f64;
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            min,
            max,
            mean,
            sum,
            range: max - min,
            std_dev: variance.sqrt(),
        })
    }
}
