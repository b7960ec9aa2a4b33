//! TOPSIS Calculator - ideal solutions, Euclidean distances and closeness scores.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

use super::configuration::TopsisConfiguration;
use super::result::{EntityResult, IdealSolution};
use super::weighted_data::WeightedData;
use crate::domain::foundation::IndicatorCode;

/// Tunables of the calculator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculatorSettings {
    /// When set and the run holds exactly one entity, ideals are spread
    /// around that entity's values by this ratio instead of collapsing
    /// onto it.
    pub single_entity_baseline_ratio: Option<f64>,
}

/// Errors raised by [`TopsisCalculator::calculate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("configuration invalid: {}", .0.join("; "))]
    InvalidConfiguration(Vec<String>),
}

/// Ideal solution and per-entity results of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub ideal: IdealSolution,
    pub results: BTreeMap<String, EntityResult>,
}

/// Pure TOPSIS computation over weighted data.
#[derive(Debug, Clone, Default)]
pub struct TopsisCalculator {
    settings: CalculatorSettings,
}

impl TopsisCalculator {
    pub fn new(settings: CalculatorSettings) -> Self {
        Self { settings }
    }

    /// Runs the full computation.
    ///
    /// # Errors
    ///
    /// Fails only for a structurally invalid configuration, which is a
    /// caller bug. Bad data never fails; it shows up as incomplete results.
    pub fn calculate(
        &self,
        data: &WeightedData,
        config: &TopsisConfiguration,
    ) -> Result<Calculation, CalculationError> {
        let problems = config.structural_problems();
        if !problems.is_empty() {
            return Err(CalculationError::InvalidConfiguration(problems));
        }

        let ideal = self.compute_ideal_solutions(data, config);
        let results = self.compute_results(data, &ideal, config);

        info!(
            entities = results.len(),
            indicators = config.indicators.len(),
            orientation = %config.orientation,
            "TOPSIS calculation completed"
        );

        Ok(Calculation { ideal, results })
    }

    /// Derives the positive and negative ideal per configured indicator.
    ///
    /// # Edge Cases
    /// - Indicator with no finite value in any entity: absent from both ideals
    /// - Single entity with a baseline ratio configured: ideals spread around
    ///   the entity's own values
    pub fn compute_ideal_solutions(
        &self,
        data: &WeightedData,
        config: &TopsisConfiguration,
    ) -> IdealSolution {
        let mut ideal = IdealSolution::default();
        let baseline = self.settings.single_entity_baseline_ratio.filter(|_| data.len() == 1);

        for indicator in &config.indicators {
            let values: Vec<f64> = data
                .entities()
                .filter_map(|(entity, _)| data.finite_value(entity, indicator.as_str()))
                .collect();
            if values.is_empty() {
                continue;
            }

            let (min, max) = match baseline {
                Some(ratio) => {
                    let value = values[0];
                    (value - value.abs() * ratio, value + value.abs() * ratio)
                }
                None => (
                    values.iter().copied().fold(f64::INFINITY, f64::min),
                    values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                ),
            };

            ideal
                .positive_ideal
                .insert(indicator.clone(), config.orientation.positive_ideal(min, max));
            ideal
                .negative_ideal
                .insert(indicator.clone(), config.orientation.negative_ideal(min, max));
        }

        debug!(
            positive = ?ideal.positive_ideal,
            negative = ?ideal.negative_ideal,
            baseline = baseline.is_some(),
            "Computed ideal solutions"
        );
        ideal
    }

    /// Computes distances and closeness for every entity in the data.
    ///
    /// Entities without a data map are still reported, with every configured
    /// indicator listed as missing.
    pub fn compute_results(
        &self,
        data: &WeightedData,
        ideal: &IdealSolution,
        config: &TopsisConfiguration,
    ) -> BTreeMap<String, EntityResult> {
        data.entities()
            .map(|(entity, _)| {
                let result = Self::entity_result(data, entity, ideal, config);
                debug!(
                    entity,
                    positive_distance = result.positive_distance,
                    negative_distance = result.negative_distance,
                    score = result.comprehensive_score,
                    missing = result.missing_indicators.len(),
                    "Computed entity distances"
                );
                (entity.to_string(), result)
            })
            .collect()
    }

    fn entity_result(
        data: &WeightedData,
        entity: &str,
        ideal: &IdealSolution,
        config: &TopsisConfiguration,
    ) -> EntityResult {
        let mut to_positive = Vec::with_capacity(config.indicators.len());
        let mut to_negative = Vec::with_capacity(config.indicators.len());
        let mut missing = Vec::new();

        for indicator in &config.indicators {
            let value = data.finite_value(entity, indicator.as_str());
            let best = ideal.positive_ideal.get(indicator);
            let worst = ideal.negative_ideal.get(indicator);
            match (value, best, worst) {
                (Some(value), Some(best), Some(worst)) => {
                    to_positive.push(value - best);
                    to_negative.push(value - worst);
                }
                _ => missing.push(indicator.clone()),
            }
        }

        EntityResult::from_distances(euclidean(&to_positive), euclidean(&to_negative))
            .with_missing_indicators(dedup_preserving_order(missing))
    }
}

/// Euclidean norm, scaled by the largest component so squares cannot overflow.
fn euclidean(differences: &[f64]) -> f64 {
    let scale = differences.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    let sum: f64 = differences.iter().map(|d| (d / scale).powi(2)).sum();
    scale * sum.sqrt()
}

fn dedup_preserving_order(codes: Vec<IndicatorCode>) -> Vec<IndicatorCode> {
    let mut out: Vec<IndicatorCode> = Vec::with_capacity(codes.len());
    for code in codes {
        if !out.contains(&code) {
            out.push(code);
        }
    }
    out
}
