//! TOPSIS evaluation configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::topsis::{CalculatorSettings, ValidatorSettings};

/// Calculation and validation tunables
#[derive(Debug, Clone, Deserialize)]
pub struct TopsisConfig {
    /// Spread of synthetic ideals around a lone entity; unset disables it
    #[serde(default)]
    pub single_entity_baseline_ratio: Option<f64>,

    /// Distance ratio above which an entity is flagged
    #[serde(default = "default_max_distance_ratio")]
    pub max_distance_ratio: f64,

    /// Allowed gap between stored and recomputed scores
    #[serde(default = "default_score_consistency_tolerance")]
    pub score_consistency_tolerance: f64,

    /// Score range below which a batch is flagged as non-discriminating
    #[serde(default = "default_low_discrimination_threshold")]
    pub low_discrimination_threshold: f64,

    /// Share of valid entities below which a batch is flagged
    #[serde(default = "default_min_valid_entity_ratio")]
    pub min_valid_entity_ratio: f64,

    /// Output param used when a step has none
    #[serde(default = "default_output_param")]
    pub default_output_param: String,
}

impl TopsisConfig {
    /// Validate TOPSIS configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ratio) = self.single_entity_baseline_ratio {
            if !(ratio > 0.0 && ratio < 1.0) {
                return Err(ValidationError::InvalidBaselineRatio(ratio));
            }
        }
        for (name, value) in [
            ("max_distance_ratio", self.max_distance_ratio),
            ("score_consistency_tolerance", self.score_consistency_tolerance),
            ("low_discrimination_threshold", self.low_discrimination_threshold),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ValidationError::NonPositive { name, value });
            }
        }
        if !(0.0..=1.0).contains(&self.min_valid_entity_ratio) {
            return Err(ValidationError::InvalidValidEntityRatio(
                self.min_valid_entity_ratio,
            ));
        }
        if self.default_output_param.trim().is_empty() {
            return Err(ValidationError::MissingRequired("topsis.default_output_param"));
        }
        Ok(())
    }

    /// Calculator settings derived from this configuration
    pub fn calculator_settings(&self) -> CalculatorSettings {
        CalculatorSettings {
            single_entity_baseline_ratio: self.single_entity_baseline_ratio,
        }
    }

    /// Validator settings derived from this configuration
    pub fn validator_settings(&self) -> ValidatorSettings {
        ValidatorSettings {
            max_distance_ratio: self.max_distance_ratio,
            score_consistency_tolerance: self.score_consistency_tolerance,
            low_discrimination_threshold: self.low_discrimination_threshold,
            min_valid_entity_ratio: self.min_valid_entity_ratio,
        }
    }
}

impl Default for TopsisConfig {
    fn default() -> Self {
        Self {
            single_entity_baseline_ratio: None,
            max_distance_ratio: default_max_distance_ratio(),
            score_consistency_tolerance: default_score_consistency_tolerance(),
            low_discrimination_threshold: default_low_discrimination_threshold(),
            min_valid_entity_ratio: default_min_valid_entity_ratio(),
            default_output_param: default_output_param(),
        }
    }
}

fn default_max_distance_ratio() -> f64 {
    1000.0
}

fn default_score_consistency_tolerance() -> f64 {
    0.001
}

fn default_low_discrimination_threshold() -> f64 {
    0.01
}

fn default_min_valid_entity_ratio() -> f64 {
    0.8
}

fn default_output_param() -> String {
    "comprehensive".to_string()
}
