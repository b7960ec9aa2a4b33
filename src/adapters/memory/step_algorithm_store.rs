//! In-memory step algorithm store.
//!
//! Holds steps and their algorithm fields in a map guarded by an async
//! `RwLock`, so writes are serialized and reads run in parallel. Used by
//! tests, the CLI and single-process deployments.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, ModelId, StepId};
use crate::ports::{StepAlgorithmStore, StepExpression, StepRef, StoredExpression};

struct StepEntry {
    step: StepRef,
    record: Option<StoredExpression>,
}

/// In-memory implementation of the StepAlgorithmStore port.
#[derive(Default)]
pub struct InMemoryStepAlgorithmStore {
    steps: RwLock<BTreeMap<(ModelId, String), StepEntry>>,
}

impl InMemoryStepAlgorithmStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a step without algorithm fields.
    pub async fn register_step(&self, step_id: StepId, model_id: ModelId, step_code: &str) {
        let step = StepRef {
            step_id,
            model_id,
            step_code: step_code.to_string(),
        };
        self.steps
            .write()
            .await
            .insert((model_id, step_code.to_string()), StepEntry { step, record: None });
    }

    /// Registers a step that already carries algorithm fields.
    pub async fn register_step_with(
        &self,
        step_id: StepId,
        model_id: ModelId,
        step_code: &str,
        record: StoredExpression,
    ) {
        self.register_step(step_id, model_id, step_code).await;
        if let Some(entry) = self
            .steps
            .write()
            .await
            .get_mut(&(model_id, step_code.to_string()))
        {
            entry.record = Some(record);
        }
    }
}

#[async_trait]
impl StepAlgorithmStore for InMemoryStepAlgorithmStore {
    async fn resolve_step(
        &self,
        model_id: ModelId,
        step_code: &str,
    ) -> Result<Option<StepRef>, DomainError> {
        Ok(self
            .steps
            .read()
            .await
            .get(&(model_id, step_code.to_string()))
            .map(|entry| entry.step.clone()))
    }

    async fn find_step(&self, step_id: StepId) -> Result<Option<StepRef>, DomainError> {
        Ok(self
            .steps
            .read()
            .await
            .values()
            .find(|entry| entry.step.step_id == step_id)
            .map(|entry| entry.step.clone()))
    }

    async fn get_expression(
        &self,
        model_id: ModelId,
        step_code: &str,
    ) -> Result<Option<StoredExpression>, DomainError> {
        Ok(self
            .steps
            .read()
            .await
            .get(&(model_id, step_code.to_string()))
            .and_then(|entry| entry.record.clone()))
    }

    async fn set_expression(
        &self,
        model_id: ModelId,
        step_code: &str,
        record: StoredExpression,
    ) -> Result<(), DomainError> {
        let mut steps = self.steps.write().await;
        let entry = steps
            .get_mut(&(model_id, step_code.to_string()))
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::StepNotFound,
                    format!("Step '{}' not found in model {}", step_code, model_id),
                )
                .with_detail("step_code", step_code)
            })?;
        entry.record = Some(record);
        Ok(())
    }

    async fn remove_expression(
        &self,
        model_id: ModelId,
        step_code: &str,
    ) -> Result<bool, DomainError> {
        Ok(self
            .steps
            .write()
            .await
            .get_mut(&(model_id, step_code.to_string()))
            .and_then(|entry| entry.record.take())
            .is_some())
    }

    async fn list_expressions(&self, model_id: ModelId) -> Result<Vec<StepExpression>, DomainError> {
        Ok(self
            .steps
            .read()
            .await
            .values()
            .filter(|entry| entry.step.model_id == model_id)
            .filter_map(|entry| {
                entry.record.clone().map(|record| StepExpression {
                    step: entry.step.clone(),
                    record,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(expression: &str) -> StoredExpression {
        StoredExpression {
            algorithm_code: "TOPSIS".to_string(),
            expression: expression.to_string(),
            output_param: "score".to_string(),
        }
    }

    #[tokio::test]
    async fn resolves_registered_steps() {
        let store = InMemoryStepAlgorithmStore::new();
        store.register_step(StepId::new(11), ModelId::new(1), "s1").await;

        let by_code = store.resolve_step(ModelId::new(1), "s1").await.unwrap().unwrap();
        let by_id = store.find_step(StepId::new(11)).await.unwrap().unwrap();

        assert_eq!(by_code, by_id);
        assert!(store.resolve_step(ModelId::new(2), "s1").await.unwrap().is_none());
        assert!(store.get_expression(ModelId::new(1), "s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_and_remove_expression() {
        let store = InMemoryStepAlgorithmStore::new();
        store.register_step(StepId::new(11), ModelId::new(1), "s1").await;

        store
            .set_expression(ModelId::new(1), "s1", record("@TOPSIS_POSITIVE:a"))
            .await
            .unwrap();
        assert_eq!(
            store.get_expression(ModelId::new(1), "s1").await.unwrap(),
            Some(record("@TOPSIS_POSITIVE:a"))
        );

        assert!(store.remove_expression(ModelId::new(1), "s1").await.unwrap());
        assert!(!store.remove_expression(ModelId::new(1), "s1").await.unwrap());
    }

    #[tokio::test]
    async fn writing_unknown_step_fails() {
        let store = InMemoryStepAlgorithmStore::new();
        let err = store
            .set_expression(ModelId::new(1), "nope", record("@TOPSIS_POSITIVE:a"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StepNotFound);
    }

    #[tokio::test]
    async fn lists_only_steps_with_expressions_in_code_order() {
        let store = InMemoryStepAlgorithmStore::new();
        store
            .register_step_with(StepId::new(2), ModelId::new(1), "b", record("@TOPSIS_POSITIVE:x"))
            .await;
        store
            .register_step_with(StepId::new(1), ModelId::new(1), "a", record("@TOPSIS_NEGATIVE:y"))
            .await;
        store.register_step(StepId::new(3), ModelId::new(1), "c").await;
        store
            .register_step_with(StepId::new(4), ModelId::new(2), "a", record("@TOPSIS_POSITIVE:z"))
            .await;

        let listed = store.list_expressions(ModelId::new(1)).await.unwrap();
        let codes: Vec<_> = listed.iter().map(|e| e.step.step_code.as_str()).collect();
        assert_eq!(codes, vec!["a", "b"]);
        assert_eq!(store.list_expressions(ModelId::new(2)).await.unwrap().len(), 1);
    }
}
