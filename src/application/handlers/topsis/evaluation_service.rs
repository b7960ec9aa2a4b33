//! TopsisEvaluationService - one scoring run for a configured step.
//!
//! Resolves the step's configuration, runs the calculator, and passes the
//! results through the validator. Results that fail validation are repaired
//! before they are returned; nothing is persisted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::config_service::TopsisConfigService;
use super::errors::{EvaluationError, TopsisConfigError};
use crate::domain::foundation::ModelId;
use crate::domain::topsis::{
    EntityResult, IdealSolution, TopsisCalculator, TopsisConfiguration, TopsisResultValidator,
    ValidationResult, WeightedData,
};

/// Final results of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub configuration: TopsisConfiguration,
    pub ideal: IdealSolution,
    pub results: BTreeMap<String, EntityResult>,
    /// Validation of `results` as returned, after any repair.
    pub validation: ValidationResult,
    /// Entities whose numbers the repair pass changed.
    pub repaired: usize,
}

impl EvaluationOutcome {
    /// Values published per entity: the score under the output param, and
    /// both distances under `<output_param>_positive` / `_negative`.
    pub fn published_scores(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        let param = &self.configuration.output_param;
        self.results
            .iter()
            .map(|(entity, result)| {
                let values = BTreeMap::from([
                    (param.clone(), result.comprehensive_score),
                    (format!("{param}_positive"), result.positive_distance),
                    (format!("{param}_negative"), result.negative_distance),
                ]);
                (entity.clone(), values)
            })
            .collect()
    }
}

pub struct TopsisEvaluationService {
    configs: Arc<TopsisConfigService>,
    calculator: TopsisCalculator,
    validator: TopsisResultValidator,
}

impl TopsisEvaluationService {
    pub fn new(
        configs: Arc<TopsisConfigService>,
        calculator: TopsisCalculator,
        validator: TopsisResultValidator,
    ) -> Self {
        Self {
            configs,
            calculator,
            validator,
        }
    }

    /// Scores `data` with the configuration stored on the step.
    ///
    /// # Errors
    ///
    /// - `ConfigurationMissing` when the step has no decodable TOPSIS expression
    /// - `Config(Rejected)` when the stored configuration is unusable
    /// - `Config(Store)` on store failures
    pub async fn evaluate(
        &self,
        model_id: ModelId,
        step_code: &str,
        data: &WeightedData,
    ) -> Result<EvaluationOutcome, EvaluationError> {
        let configuration = self
            .configs
            .get_by_step(model_id, step_code)
            .await?
            .ok_or_else(|| EvaluationError::ConfigurationMissing {
                model_id,
                step_code: step_code.to_string(),
            })?;

        let problems = configuration.problems();
        if !problems.is_empty() {
            return Err(TopsisConfigError::Rejected(problems).into());
        }

        let calculation = self.calculator.calculate(data, &configuration)?;
        let mut results = calculation.results;
        let mut validation = self.validator.validate(&results, &configuration);
        let mut repaired = 0;

        if !validation.valid {
            let fixed = self.validator.repair(&results, &configuration);
            repaired = fixed
                .iter()
                .filter(|(code, result)| results.get(*code) != Some(*result))
                .count();
            if repaired > 0 {
                validation = self.validator.validate(&fixed, &configuration);
                results = fixed;
            }
            if !validation.valid {
                warn!(
                    model_id = %model_id,
                    step_code,
                    issues = ?validation.issues,
                    "TOPSIS results remain invalid"
                );
            }
        }

        info!(
            model_id = %model_id,
            step_code,
            entities = results.len(),
            repaired,
            valid = validation.valid,
            "TOPSIS evaluation finished"
        );

        Ok(EvaluationOutcome {
            configuration,
            ideal: calculation.ideal,
            results,
            validation,
            repaired,
        })
    }
}
