//! StepAlgorithmStore port - Raw algorithm expressions attached to pipeline steps.
//!
//! The store owns persistence of the expression string and the output param
//! of each step. Writes for the same (model, step code) are serialized by
//! the implementation; callers do not lock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ModelId, StepId};

/// Location of a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepRef {
    pub step_id: StepId,
    pub model_id: ModelId,
    pub step_code: String,
}

/// Algorithm fields persisted on a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredExpression {
    pub algorithm_code: String,
    pub expression: String,
    pub output_param: String,
}

/// A step together with its stored algorithm fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepExpression {
    pub step: StepRef,
    pub record: StoredExpression,
}

/// Port for reading and writing step algorithm expressions.
#[async_trait]
pub trait StepAlgorithmStore: Send + Sync {
    /// Looks up a step by its (model, code) location.
    async fn resolve_step(
        &self,
        model_id: ModelId,
        step_code: &str,
    ) -> Result<Option<StepRef>, DomainError>;

    /// Looks up a step by id.
    async fn find_step(&self, step_id: StepId) -> Result<Option<StepRef>, DomainError>;

    /// Returns the stored algorithm fields, if the step has any.
    async fn get_expression(
        &self,
        model_id: ModelId,
        step_code: &str,
    ) -> Result<Option<StoredExpression>, DomainError>;

    /// Writes the algorithm fields of an existing step.
    ///
    /// Fails with `StepNotFound` when the step does not exist.
    async fn set_expression(
        &self,
        model_id: ModelId,
        step_code: &str,
        record: StoredExpression,
    ) -> Result<(), DomainError>;

    /// Clears the algorithm fields. Returns whether anything was removed.
    async fn remove_expression(&self, model_id: ModelId, step_code: &str)
        -> Result<bool, DomainError>;

    /// Every step of the model that carries algorithm fields.
    async fn list_expressions(&self, model_id: ModelId) -> Result<Vec<StepExpression>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn StepAlgorithmStore) {}

    #[test]
    fn stored_expression_round_trips_through_json() {
        let record = StoredExpression {
            algorithm_code: "TOPSIS".to_string(),
            expression: "@TOPSIS_POSITIVE:a".to_string(),
            output_param: "score".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: StoredExpression = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
