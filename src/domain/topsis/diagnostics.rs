//! Diagnostic Service - explains a TOPSIS run without persisting anything.
//!
//! Wraps input inspection, the calculator and the validator into a single
//! report, or into a staged trace for following a run step by step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

use super::calculator::TopsisCalculator;
use super::configuration::TopsisConfiguration;
use super::input_check::{InputDataCheck, EMPTY_INPUT_ISSUE};
use super::result::{EntityResult, IdealSolution};
use super::validator::{TopsisResultValidator, ValidationResult, INVALID_CONFIGURATION_ISSUE};
use super::weighted_data::WeightedData;
use crate::domain::foundation::{IndicatorCode, ModelId, Timestamp};

/// Output param used for configurations inferred from the data.
pub const DIAGNOSTIC_OUTPUT_PARAM: &str = "comprehensive";

/// Headline numbers of a diagnosed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticMetrics {
    pub entity_count: usize,
    pub indicator_count: usize,
    pub valid_entities: usize,
    pub invalid_entities: usize,
    pub incomplete_entities: usize,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub mean_score: Option<f64>,
}

/// Everything the calculator and validator produced for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationDetails {
    pub configuration: TopsisConfiguration,
    pub ideal: IdealSolution,
    pub results: BTreeMap<String, EntityResult>,
    pub validation: ValidationResult,
    pub non_discriminating_indicators: Vec<IndicatorCode>,
}

/// Human-inspectable explanation of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub model_id: ModelId,
    pub step_code: String,
    pub generated_at: Timestamp,
    pub metrics: DiagnosticMetrics,
    pub input_summary: InputDataCheck,
    pub calculation_details: Option<CalculationDetails>,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub has_issues: bool,
}

/// Stage of a calculation trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStage {
    InputValidation,
    IdealSolution,
    DistanceCalculation,
    ResultValidation,
}

/// One recorded stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    pub stage: TraceStage,
    pub at: Timestamp,
    pub success: bool,
    pub detail: String,
}

/// Staged log of a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationTrace {
    pub trace_id: Uuid,
    pub model_id: ModelId,
    pub step_code: String,
    pub started_at: Timestamp,
    pub completed_at: Timestamp,
    pub elapsed_ms: u64,
    pub input_size: usize,
    pub success: bool,
    pub steps: Vec<TraceStep>,
}

impl CalculationTrace {
    fn record(&mut self, stage: TraceStage, success: bool, detail: impl Into<String>) {
        self.steps.push(TraceStep {
            stage,
            at: Timestamp::now(),
            success,
            detail: detail.into(),
        });
    }
}

/// Orchestrates input check, calculator and validator for inspection.
#[derive(Debug, Clone, Default)]
pub struct TopsisDiagnostics {
    calculator: TopsisCalculator,
    validator: TopsisResultValidator,
}

impl TopsisDiagnostics {
    pub fn new(calculator: TopsisCalculator, validator: TopsisResultValidator) -> Self {
        Self {
            calculator,
            validator,
        }
    }

    /// Inspects input data before any calculation.
    pub fn validate_input_data(&self, data: &WeightedData) -> InputDataCheck {
        InputDataCheck::inspect(data)
    }

    /// Diagnoses a run over every indicator present in the data.
    pub fn diagnose(&self, data: &WeightedData, model_id: ModelId, step_code: &str) -> DiagnosticReport {
        let config = inferred_configuration(data, model_id, step_code);
        self.diagnose_with_config(data, model_id, step_code, &config)
    }

    /// Diagnoses a run under a known configuration.
    ///
    /// Always returns a report; empty input or an invalid configuration
    /// show up as issues with no calculation details.
    pub fn diagnose_with_config(
        &self,
        data: &WeightedData,
        model_id: ModelId,
        step_code: &str,
        config: &TopsisConfiguration,
    ) -> DiagnosticReport {
        let input_summary = self.validate_input_data(data);
        let mut report = DiagnosticReport {
            model_id,
            step_code: step_code.to_string(),
            generated_at: Timestamp::now(),
            metrics: DiagnosticMetrics {
                entity_count: input_summary.entity_count,
                indicator_count: input_summary.indicator_count,
                ..Default::default()
            },
            issues: input_summary.issues.clone(),
            input_summary,
            calculation_details: None,
            warnings: Vec::new(),
            recommendations: Vec::new(),
            has_issues: false,
        };

        if data.is_empty() {
            report
                .recommendations
                .push("provide weighted indicator data for at least one entity".to_string());
            return finish(report);
        }

        let calculation = match self.calculator.calculate(data, config) {
            Ok(calculation) => calculation,
            Err(err) => {
                report.issues.push(err.to_string());
                report
                    .recommendations
                    .push("fix the step's TOPSIS configuration before evaluating".to_string());
                return finish(report);
            }
        };

        let validation = self.validator.validate(&calculation.results, config);
        let non_discriminating = calculation.ideal.non_discriminating();

        report.metrics.valid_entities = validation.statistics.valid_entities;
        report.metrics.invalid_entities = validation.statistics.invalid_entities;
        report.metrics.incomplete_entities = validation.statistics.incomplete_entities;
        if let Some(scores) = &validation.statistics.comprehensive_score {
            report.metrics.min_score = Some(scores.min);
            report.metrics.max_score = Some(scores.max);
            report.metrics.mean_score = Some(scores.mean);
        }

        report.issues.extend(validation.issues.iter().cloned());
        report.warnings.extend(validation.warnings.iter().cloned());
        report.warnings.extend(non_discriminating.iter().map(|code| {
            format!("indicator '{code}' does not discriminate: positive and negative ideal coincide")
        }));

        report.recommendations = recommendations(&report, &validation, &non_discriminating);
        report.calculation_details = Some(CalculationDetails {
            configuration: config.clone(),
            ideal: calculation.ideal,
            results: calculation.results,
            validation,
            non_discriminating_indicators: non_discriminating,
        });

        finish(report)
    }

    /// Runs the calculation stage by stage, recording each stage.
    pub fn generate_calculation_log(
        &self,
        data: &WeightedData,
        model_id: ModelId,
        step_code: &str,
    ) -> CalculationTrace {
        let started_at = Timestamp::now();
        let mut trace = CalculationTrace {
            trace_id: Uuid::new_v4(),
            model_id,
            step_code: step_code.to_string(),
            started_at,
            completed_at: started_at,
            elapsed_ms: 0,
            input_size: data.len(),
            success: false,
            steps: Vec::new(),
        };

        let input = self.validate_input_data(data);
        if data.is_empty() {
            trace.record(TraceStage::InputValidation, false, EMPTY_INPUT_ISSUE);
            return close(trace);
        }
        trace.record(
            TraceStage::InputValidation,
            true,
            format!(
                "{} entities, {} indicators, {} issues",
                input.entity_count,
                input.indicator_count,
                input.issues.len()
            ),
        );

        let config = inferred_configuration(data, model_id, step_code);
        let problems = config.structural_problems();
        if !problems.is_empty() {
            trace.record(
                TraceStage::IdealSolution,
                false,
                format!("{INVALID_CONFIGURATION_ISSUE}: {}", problems.join("; ")),
            );
            return close(trace);
        }

        let ideal = self.calculator.compute_ideal_solutions(data, &config);
        trace.record(
            TraceStage::IdealSolution,
            !ideal.positive_ideal.is_empty(),
            format!(
                "positive ideal {:?}, negative ideal {:?}",
                ideal.positive_ideal, ideal.negative_ideal
            ),
        );

        let results = self.calculator.compute_results(data, &ideal, &config);
        let incomplete = results.values().filter(|r| !r.is_complete()).count();
        trace.record(
            TraceStage::DistanceCalculation,
            true,
            format!("{} entities scored, {} incomplete", results.len(), incomplete),
        );

        let validation = self.validator.validate(&results, &config);
        trace.record(
            TraceStage::ResultValidation,
            validation.valid,
            format!(
                "{} of {} entities valid, {} issues, {} warnings",
                validation.statistics.valid_entities,
                validation.statistics.total_entities,
                validation.issues.len(),
                validation.warnings.len()
            ),
        );

        trace.success = trace.steps.iter().all(|s| s.success);
        close(trace)
    }
}

fn inferred_configuration(data: &WeightedData, model_id: ModelId, step_code: &str) -> TopsisConfiguration {
    TopsisConfiguration::for_observed_indicators(data.observed_indicators(), DIAGNOSTIC_OUTPUT_PARAM)
        .located_at(model_id, step_code)
}

fn recommendations(
    report: &DiagnosticReport,
    validation: &ValidationResult,
    non_discriminating: &[IndicatorCode],
) -> Vec<String> {
    let input = &report.input_summary;
    let mut out = Vec::new();

    if input.has_non_finite_values() {
        out.push("clean or impute null, NaN and infinite indicator values upstream".to_string());
    }
    if !input.null_entities.is_empty() {
        out.push("supply indicator data for entities that have none".to_string());
    }
    if !input.inconsistent_entities.is_empty() {
        out.push("align indicator sets so every entity reports every indicator".to_string());
    }
    if !validation.valid {
        out.push("repair the results before publishing scores".to_string());
    }
    if !non_discriminating.is_empty() {
        out.push("drop or re-weight indicators that do not vary across entities".to_string());
    }
    if report.metrics.entity_count == 1 {
        out.push("enable a single-entity baseline ratio to score lone entities".to_string());
    }
    out
}

fn finish(mut report: DiagnosticReport) -> DiagnosticReport {
    report.has_issues = !report.issues.is_empty();
    if report.has_issues {
        warn!(
            model_id = %report.model_id,
            step_code = %report.step_code,
            issues = report.issues.len(),
            "TOPSIS diagnosis found issues"
        );
    } else {
        info!(
            model_id = %report.model_id,
            step_code = %report.step_code,
            entities = report.metrics.entity_count,
            "TOPSIS diagnosis clean"
        );
    }
    report
}

fn close(mut trace: CalculationTrace) -> CalculationTrace {
    trace.completed_at = Timestamp::now();
    trace.elapsed_ms = trace.completed_at.millis_since(&trace.started_at);
    trace
}
