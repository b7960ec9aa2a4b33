//! Result Validator - sanity checks and numeric repair of calculator output.
//!
//! Validation reports, repair fixes. A batch with a few corrupt entities
//! is repaired entity by entity so one bad region never sinks the run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::configuration::TopsisConfiguration;
use super::input_check::EMPTY_INPUT_ISSUE;
use super::result::{closeness, EntityResult};
use super::statistics::DistributionStats;

/// Prefix of the issue raised for a structurally invalid configuration.
pub const INVALID_CONFIGURATION_ISSUE: &str = "configuration invalid";

/// Thresholds for the validator's warnings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatorSettings {
    /// Larger/smaller distance ratio above which an entity is flagged.
    pub max_distance_ratio: f64,
    /// Allowed gap between a stored score and the one its distances imply.
    pub score_consistency_tolerance: f64,
    /// Score range below which the batch is said not to discriminate.
    pub low_discrimination_threshold: f64,
    /// Share of valid entities below which the batch is flagged.
    pub min_valid_entity_ratio: f64,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            max_distance_ratio: 1000.0,
            score_consistency_tolerance: 0.001,
            low_discrimination_threshold: 0.01,
            min_valid_entity_ratio: 0.8,
        }
    }
}

/// Counters and distributions of a validated batch, taken before repair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationStatistics {
    pub total_entities: usize,
    pub valid_entities: usize,
    pub invalid_entities: usize,
    pub invalid_distances: usize,
    pub invalid_scores: usize,
    pub zero_distances: usize,
    pub incomplete_entities: usize,
    pub positive_distance: Option<DistributionStats>,
    pub negative_distance: Option<DistributionStats>,
    pub comprehensive_score: Option<DistributionStats>,
}

/// Outcome of validating a whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub statistics: ValidationStatistics,
}

/// Outcome of validating one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityValidationResult {
    pub entity_code: String,
    pub valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

/// Validates and repairs [`EntityResult`]s.
#[derive(Debug, Clone, Default)]
pub struct TopsisResultValidator {
    settings: ValidatorSettings,
}

impl TopsisResultValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self { settings }
    }

    /// Validates a batch.
    ///
    /// # Edge Cases
    /// - Invalid configuration: invalid, whatever the results hold
    /// - Empty results: invalid with the empty-input issue
    pub fn validate(
        &self,
        results: &BTreeMap<String, EntityResult>,
        config: &TopsisConfiguration,
    ) -> ValidationResult {
        let mut issues = Vec::new();
        let mut warnings = Vec::new();
        let mut stats = ValidationStatistics {
            total_entities: results.len(),
            ..Default::default()
        };

        let problems = config.structural_problems();
        if !problems.is_empty() {
            issues.push(format!("{INVALID_CONFIGURATION_ISSUE}: {}", problems.join("; ")));
        }
        if results.is_empty() {
            issues.push(EMPTY_INPUT_ISSUE.to_string());
        }

        for (code, result) in results {
            let entity = self.validate_entity(code, result, config);

            if !is_sane_distance(result.positive_distance)
                || !is_sane_distance(result.negative_distance)
            {
                stats.invalid_distances += 1;
            }
            if !is_sane_score(result.comprehensive_score) {
                stats.invalid_scores += 1;
            }
            if result.positive_distance == 0.0 && result.negative_distance == 0.0 {
                stats.zero_distances += 1;
            }
            if !result.is_complete() {
                stats.incomplete_entities += 1;
            }

            if entity.valid {
                stats.valid_entities += 1;
            } else {
                stats.invalid_entities += 1;
            }
            issues.extend(entity.issues.into_iter().map(|i| format!("{code}: {i}")));
            warnings.extend(entity.warnings.into_iter().map(|w| format!("{code}: {w}")));
        }

        stats.positive_distance =
            DistributionStats::from_values(results.values().map(|r| r.positive_distance));
        stats.negative_distance =
            DistributionStats::from_values(results.values().map(|r| r.negative_distance));
        stats.comprehensive_score =
            DistributionStats::from_values(results.values().map(|r| r.comprehensive_score));

        if let Some(scores) = &stats.comprehensive_score {
            if scores.count > 1 && scores.range < self.settings.low_discrimination_threshold {
                warnings.push(format!(
                    "low discrimination: score range {:.6} is below {}",
                    scores.range, self.settings.low_discrimination_threshold
                ));
            }
        }
        if stats.total_entities > 0 {
            let ratio = stats.valid_entities as f64 / stats.total_entities as f64;
            if ratio < self.settings.min_valid_entity_ratio {
                warnings.push(format!(
                    "only {:.1}% of entities are valid; check the input data",
                    ratio * 100.0
                ));
            }
        }

        let valid = issues.is_empty();
        info!(
            valid,
            total = stats.total_entities,
            valid_entities = stats.valid_entities,
            issues = issues.len(),
            warnings = warnings.len(),
            "Validated TOPSIS results"
        );

        ValidationResult {
            valid,
            issues,
            warnings,
            statistics: stats,
        }
    }

    /// Validates one entity. Issue texts name the defect category
    /// (`NaN`, `infinite`, `negative`, `out of range`).
    pub fn validate_entity(
        &self,
        entity_code: &str,
        result: &EntityResult,
        config: &TopsisConfiguration,
    ) -> EntityValidationResult {
        let mut issues = Vec::new();
        let mut warnings = Vec::new();

        check_distance("positive distance", result.positive_distance, &mut issues);
        check_distance("negative distance", result.negative_distance, &mut issues);

        let score = result.comprehensive_score;
        if score.is_nan() {
            issues.push("comprehensive score is NaN".to_string());
        } else if score.is_infinite() {
            issues.push("comprehensive score is infinite".to_string());
        } else if !(0.0..=1.0).contains(&score) {
            issues.push(format!("comprehensive score {score} is out of range [0, 1]"));
        }

        if issues.is_empty() {
            let (p, n) = (result.positive_distance, result.negative_distance);
            if p == 0.0 && n == 0.0 {
                warnings.push("both distances are zero; score carries no information".to_string());
            } else if p > 0.0 && n > 0.0 {
                let ratio = p.max(n) / p.min(n);
                if ratio > self.settings.max_distance_ratio {
                    warnings.push(format!("extreme distance ratio {ratio:.1}"));
                }
            }

            let expected = closeness(p, n);
            if (score - expected).abs() > self.settings.score_consistency_tolerance {
                warnings.push(format!(
                    "comprehensive score {score:.6} is inconsistent with distances (expected {expected:.6})"
                ));
            }
        }

        if !result.missing_indicators.is_empty() {
            let missing: Vec<&str> = result.missing_indicators.iter().map(|i| i.as_str()).collect();
            if missing.len() >= config.indicators.len() && !config.indicators.is_empty() {
                warnings.push("no configured indicator had a usable value".to_string());
            } else {
                warnings.push(format!("incomplete: missing {}", missing.join(", ")));
            }
        }

        EntityValidationResult {
            entity_code: entity_code.to_string(),
            valid: issues.is_empty(),
            issues,
            warnings,
        }
    }

    /// Repairs every entity of a batch.
    pub fn repair(
        &self,
        results: &BTreeMap<String, EntityResult>,
        config: &TopsisConfiguration,
    ) -> BTreeMap<String, EntityResult> {
        if !config.is_structurally_valid() {
            warn!(
                step_code = config.step_code.as_deref().unwrap_or(""),
                "Repairing results under an invalid configuration"
            );
        }

        let mut repaired_count = 0usize;
        let repaired = results
            .iter()
            .map(|(code, result)| {
                let repaired = self.repair_entity(code, result, config);
                if !same_numbers(&repaired, result) {
                    repaired_count += 1;
                }
                (code.clone(), repaired)
            })
            .collect();

        if repaired_count > 0 {
            info!(repaired = repaired_count, total = results.len(), "Repaired TOPSIS results");
        }
        repaired
    }

    /// Repairs one entity: non-finite or negative distances become zero and
    /// the score is recomputed from the sanitized distances.
    ///
    /// Idempotent, and the output always satisfies the validity rules.
    pub fn repair_entity(
        &self,
        entity_code: &str,
        result: &EntityResult,
        _config: &TopsisConfiguration,
    ) -> EntityResult {
        let positive_distance = sanitize_distance(result.positive_distance);
        let negative_distance = sanitize_distance(result.negative_distance);
        let repaired = EntityResult {
            positive_distance,
            negative_distance,
            comprehensive_score: closeness(positive_distance, negative_distance),
            missing_indicators: result.missing_indicators.clone(),
        };

        if !same_numbers(&repaired, result) {
            debug!(
                entity = entity_code,
                before_positive = result.positive_distance,
                before_negative = result.negative_distance,
                before_score = result.comprehensive_score,
                after_score = repaired.comprehensive_score,
                "Repaired entity result"
            );
        }
        repaired
    }
}

fn check_distance(label: &str, value: f64, issues: &mut Vec<String>) {
    if value.is_nan() {
        issues.push(format!("{label} is NaN"));
    } else if value.is_infinite() {
        issues.push(format!("{label} is infinite"));
    } else if value < 0.0 {
        issues.push(format!("{label} {value} is negative"));
    }
}

fn is_sane_distance(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn is_sane_score(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

fn sanitize_distance(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Bitwise comparison so NaN inputs count as changed.
fn same_numbers(a: &EntityResult, b: &EntityResult) -> bool {
    a.positive_distance.to_bits() == b.positive_distance.to_bits()
        && a.negative_distance.to_bits() == b.negative_distance.to_bits()
        && a.comprehensive_score.to_bits() == b.comprehensive_score.to_bits()
}
