//! Data-quality inspection of weighted data before calculation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::weighted_data::WeightedData;
use crate::domain::foundation::IndicatorCode;

/// Issue text shared by every check that rejects empty input.
pub const EMPTY_INPUT_ISSUE: &str = "weighted data is empty";

/// Summary of the input's shape and defects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDataCheck {
    pub valid: bool,
    pub entity_count: usize,
    pub indicator_count: usize,
    /// Union of indicator codes observed across entities.
    pub indicators: BTreeSet<IndicatorCode>,
    pub total_values: usize,
    pub null_count: usize,
    pub nan_count: usize,
    pub infinite_count: usize,
    /// Zeros are legal; counted because an all-zero column usually means
    /// an upstream weighting problem.
    pub zero_count: usize,
    pub null_entities: Vec<String>,
    pub inconsistent_entities: Vec<String>,
    pub issues: Vec<String>,
}

impl InputDataCheck {
    /// Inspects the data. Never fails; every defect becomes an issue.
    pub fn inspect(data: &WeightedData) -> Self {
        let indicators = data.observed_indicators();
        let mut check = Self {
            valid: true,
            entity_count: data.len(),
            indicator_count: indicators.len(),
            indicators,
            total_values: 0,
            null_count: 0,
            nan_count: 0,
            infinite_count: 0,
            zero_count: 0,
            null_entities: Vec::new(),
            inconsistent_entities: Vec::new(),
            issues: Vec::new(),
        };

        if data.is_empty() {
            check.issues.push(EMPTY_INPUT_ISSUE.to_string());
            check.valid = false;
            return check;
        }

        for (entity, values) in data.entities() {
            let Some(values) = values else {
                check.null_entities.push(entity.to_string());
                check
                    .issues
                    .push(format!("entity '{entity}' has null indicator data"));
                continue;
            };

            for (indicator, value) in values {
                check.total_values += 1;
                match value {
                    None => {
                        check.null_count += 1;
                        check
                            .issues
                            .push(format!("entity '{entity}' indicator '{indicator}' is null"));
                    }
                    Some(v) if v.is_nan() => {
                        check.nan_count += 1;
                        check
                            .issues
                            .push(format!("entity '{entity}' indicator '{indicator}' is NaN"));
                    }
                    Some(v) if v.is_infinite() => {
                        check.infinite_count += 1;
                        check
                            .issues
                            .push(format!("entity '{entity}' indicator '{indicator}' is infinite"));
                    }
                    Some(v) if *v == 0.0 => check.zero_count += 1,
                    Some(_) => {}
                }
            }

            let lacking: Vec<&str> = check
                .indicators
                .iter()
                .filter(|code| !values.contains_key(*code))
                .map(|code| code.as_str())
                .collect();
            if !lacking.is_empty() {
                check.inconsistent_entities.push(entity.to_string());
                check.issues.push(format!(
                    "entity '{entity}' lacks indicators present elsewhere: {}",
                    lacking.join(", ")
                ));
            }
        }

        check.valid = check.issues.is_empty();
        check
    }

    /// True when some value is null, NaN or infinite.
    pub fn has_non_finite_values(&self) -> bool {
        self.null_count + self.nan_count + self.infinite_count > 0
    }
}
