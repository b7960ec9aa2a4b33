//! TOPSIS configuration value object.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::expression::{ExpressionCodec, TopsisExpression};
use super::orientation::Orientation;
use crate::domain::foundation::{IndicatorCode, ModelId, StepId, ValidationError};

/// Algorithm code every TOPSIS step record carries.
pub const TOPSIS_ALGORITHM_CODE: &str = "TOPSIS";

/// True when a stored step record belongs to TOPSIS.
///
/// Either the algorithm code is `TOPSIS` or the expression carries an
/// `@TOPSIS` directive, both in any case. A plain mention such as
/// `grade(topsis_score)` belongs to another algorithm.
pub fn is_topsis_tagged(algorithm_code: &str, expression: &str) -> bool {
    algorithm_code.trim().eq_ignore_ascii_case(TOPSIS_ALGORITHM_CODE)
        || ExpressionCodec::mentions_topsis(expression)
}

/// Indicators feeding a TOPSIS step, their orientation and the output name.
///
/// Fields are public so that records read back from a store can be held
/// even when malformed; [`TopsisConfiguration::new`] is the validating
/// factory for configurations built in code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopsisConfiguration {
    pub step_id: Option<StepId>,
    pub algorithm_code: String,
    pub indicators: Vec<IndicatorCode>,
    pub output_param: String,
    pub orientation: Orientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<ModelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_code: Option<String>,
}

impl TopsisConfiguration {
    /// Creates a validated configuration bound to a step.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the indicator list is empty, holds a
    /// blank or duplicated code, or the output param is blank.
    pub fn new<I, S>(
        step_id: StepId,
        indicators: I,
        output_param: impl Into<String>,
        orientation: Orientation,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<IndicatorCode>,
    {
        let indicators: Vec<IndicatorCode> = indicators.into_iter().map(Into::into).collect();
        let output_param = output_param.into();

        if indicators.is_empty() {
            return Err(ValidationError::empty_field("indicators"));
        }
        let mut seen = HashSet::new();
        for indicator in &indicators {
            if indicator.is_blank() {
                return Err(ValidationError::invalid_format(
                    "indicators",
                    "indicator codes cannot be blank",
                ));
            }
            if !seen.insert(indicator.as_str()) {
                return Err(ValidationError::duplicate("indicators", indicator.as_str()));
            }
        }
        if output_param.trim().is_empty() {
            return Err(ValidationError::empty_field("output_param"));
        }

        Ok(Self {
            step_id: Some(step_id),
            algorithm_code: TOPSIS_ALGORITHM_CODE.to_string(),
            indicators,
            output_param,
            orientation,
            original_expression: None,
            model_id: None,
            step_code: None,
        })
    }

    /// Builds a configuration from a stored step record.
    ///
    /// Returns `None` when the expression does not decode. The result is not
    /// validated; run [`TopsisConfiguration::problems`] on it.
    pub fn from_expression(
        step_id: Option<StepId>,
        algorithm_code: impl Into<String>,
        output_param: impl Into<String>,
        expression: &str,
    ) -> Option<Self> {
        let decoded = ExpressionCodec::decode(expression)?;
        Some(Self {
            step_id,
            algorithm_code: algorithm_code.into(),
            indicators: decoded.indicators,
            output_param: output_param.into(),
            orientation: decoded.orientation,
            original_expression: Some(expression.to_string()),
            model_id: None,
            step_code: None,
        })
    }

    /// Configuration over whatever indicators the data carries, for
    /// diagnosing data that has no stored step.
    pub fn for_observed_indicators(
        indicators: impl IntoIterator<Item = IndicatorCode>,
        output_param: impl Into<String>,
    ) -> Self {
        Self {
            step_id: Some(StepId::DETACHED),
            algorithm_code: TOPSIS_ALGORITHM_CODE.to_string(),
            indicators: indicators.into_iter().collect(),
            output_param: output_param.into(),
            orientation: Orientation::Positive,
            original_expression: None,
            model_id: None,
            step_code: None,
        }
    }

    /// Attaches the (model, step code) location of the owning step.
    pub fn located_at(mut self, model_id: ModelId, step_code: impl Into<String>) -> Self {
        self.model_id = Some(model_id);
        self.step_code = Some(step_code.into());
        self
    }

    /// Structured expression for this configuration.
    pub fn expression(&self) -> TopsisExpression {
        TopsisExpression {
            orientation: self.orientation,
            indicators: self.indicators.clone(),
        }
    }

    /// Encoded DSL text for this configuration.
    pub fn encoded_expression(&self) -> String {
        ExpressionCodec::encode(&self.expression())
    }

    /// Violations of the step id / algorithm code / indicator invariants.
    ///
    /// A repeated indicator counts here: it would weigh twice in both
    /// distances.
    pub fn structural_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.step_id.is_none() {
            problems.push("step id is missing".to_string());
        }
        if self.algorithm_code.trim().is_empty() {
            problems.push("algorithm code is empty".to_string());
        }
        if self.indicators.is_empty() {
            problems.push("indicator list is empty".to_string());
        }
        let mut seen = HashSet::new();
        for indicator in &self.indicators {
            if !indicator.is_blank() && !seen.insert(indicator.as_str()) {
                problems.push(ValidationError::duplicate("indicators", indicator.as_str()).to_string());
            }
        }
        problems
    }

    pub fn is_structurally_valid(&self) -> bool {
        self.structural_problems().is_empty()
    }

    /// Every problem that makes this configuration unusable for a step:
    /// the structural ones plus algorithm identity, indicator hygiene and
    /// the output param.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = self.structural_problems();

        let code = self.algorithm_code.trim();
        if !code.is_empty() && code != TOPSIS_ALGORITHM_CODE {
            problems.push(
                ValidationError::mismatch("algorithm_code", TOPSIS_ALGORITHM_CODE, code)
                    .to_string(),
            );
        }

        if self.indicators.iter().any(IndicatorCode::is_blank) {
            problems.push("indicator list contains a blank code".to_string());
        }

        if self.output_param.trim().is_empty() {
            problems.push(ValidationError::empty_field("output_param").to_string());
        }
        problems
    }
}
