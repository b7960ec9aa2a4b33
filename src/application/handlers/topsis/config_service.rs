//! TopsisConfigService - CRUD and validation of TOPSIS step configurations.
//!
//! Translates between [`TopsisConfiguration`] and the step store's raw
//! expression field via the codec. Per-key write serialization belongs to
//! the store.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use super::errors::TopsisConfigError;
use crate::domain::foundation::{IndicatorCode, ModelId, StepId};
use crate::domain::topsis::{
    is_topsis_tagged, Orientation, TopsisConfiguration, TOPSIS_ALGORITHM_CODE,
};
use crate::ports::{IndicatorCatalog, StepAlgorithmStore, StepRef, StoredExpression};

/// Indicator counts outside this range earn a warning.
const MIN_RECOMMENDED_INDICATORS: usize = 2;
const MAX_RECOMMENDED_INDICATORS: usize = 10;

/// Result of validating a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Partition of candidate indicators against the model's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorValidationResult {
    pub valid: bool,
    pub valid_indicators: Vec<IndicatorCode>,
    pub invalid_indicators: Vec<IndicatorCode>,
    pub warnings: Vec<String>,
}

/// Service for storing and validating TOPSIS configurations.
pub struct TopsisConfigService {
    store: Arc<dyn StepAlgorithmStore>,
    catalog: Arc<dyn IndicatorCatalog>,
    default_output_param: String,
}

impl TopsisConfigService {
    pub fn new(
        store: Arc<dyn StepAlgorithmStore>,
        catalog: Arc<dyn IndicatorCatalog>,
        default_output_param: impl Into<String>,
    ) -> Self {
        Self {
            store,
            catalog,
            default_output_param: default_output_param.into(),
        }
    }

    /// Stores a new configuration on its step.
    ///
    /// The step is located by (model, step code) when both are set,
    /// otherwise by step id.
    pub async fn create(
        &self,
        config: &TopsisConfiguration,
    ) -> Result<TopsisConfiguration, TopsisConfigError> {
        let validation = self.validate(config);
        if !validation.valid {
            return Err(TopsisConfigError::Rejected(validation.errors));
        }

        let step = self.locate(config).await?;
        let existing = self.owned_record(&step).await?;
        if existing.is_some_and(|record| to_configuration(&step, &record).is_some()) {
            return Err(TopsisConfigError::AlreadyConfigured {
                step_code: step.step_code,
            });
        }

        self.write(&step, config.orientation, &config.indicators, &config.output_param)
            .await
    }

    /// Configuration of a step, by step id.
    pub async fn get(&self, step_id: StepId) -> Result<Option<TopsisConfiguration>, TopsisConfigError> {
        match self.store.find_step(step_id).await? {
            Some(step) => self.read(&step).await,
            None => Ok(None),
        }
    }

    /// Configuration of a step, by (model, step code).
    pub async fn get_by_step(
        &self,
        model_id: ModelId,
        step_code: &str,
    ) -> Result<Option<TopsisConfiguration>, TopsisConfigError> {
        match self.store.resolve_step(model_id, step_code).await? {
            Some(step) => self.read(&step).await,
            None => Ok(None),
        }
    }

    /// Replaces indicators and orientation of a step found by id.
    pub async fn update(
        &self,
        step_id: StepId,
        indicators: Vec<IndicatorCode>,
        orientation_tag: &str,
    ) -> Result<TopsisConfiguration, TopsisConfigError> {
        let step = self
            .store
            .find_step(step_id)
            .await?
            .ok_or_else(|| TopsisConfigError::StepNotFound(step_id.to_string()))?;
        self.update_step(step, indicators, orientation_tag).await
    }

    /// Replaces indicators and orientation of a step found by (model, code).
    pub async fn update_by_step(
        &self,
        model_id: ModelId,
        step_code: &str,
        indicators: Vec<IndicatorCode>,
        orientation_tag: &str,
    ) -> Result<TopsisConfiguration, TopsisConfigError> {
        let step = self
            .store
            .resolve_step(model_id, step_code)
            .await?
            .ok_or_else(|| TopsisConfigError::StepNotFound(format!("'{step_code}'")))?;
        self.update_step(step, indicators, orientation_tag).await
    }

    /// Removes the configuration of a step.
    ///
    /// Records of other algorithms are left alone and reported as
    /// `NotConfigured`.
    pub async fn delete(&self, model_id: ModelId, step_code: &str) -> Result<(), TopsisConfigError> {
        let owned = self
            .store
            .get_expression(model_id, step_code)
            .await?
            .is_some_and(|record| is_topsis_tagged(&record.algorithm_code, &record.expression));
        if owned && self.store.remove_expression(model_id, step_code).await? {
            info!(model_id = %model_id, step_code, "Deleted TOPSIS configuration");
            Ok(())
        } else {
            Err(TopsisConfigError::NotConfigured {
                step_code: step_code.to_string(),
            })
        }
    }

    /// Every decodable TOPSIS configuration of a model, by step code.
    pub async fn list_all(&self, model_id: ModelId) -> Result<Vec<TopsisConfiguration>, TopsisConfigError> {
        let mut configs: Vec<TopsisConfiguration> = self
            .store
            .list_expressions(model_id)
            .await?
            .into_iter()
            .filter_map(|entry| to_configuration(&entry.step, &entry.record))
            .collect();
        configs.sort_by(|a, b| a.step_code.cmp(&b.step_code));
        Ok(configs)
    }

    /// Checks structure, algorithm identity and indicator hygiene.
    pub fn validate(&self, config: &TopsisConfiguration) -> ConfigValidation {
        let errors = config.problems();
        let mut warnings = Vec::new();

        let count = config.indicators.len();
        if count > 0 && count < MIN_RECOMMENDED_INDICATORS {
            warnings.push(format!(
                "only {count} indicator configured; at least {MIN_RECOMMENDED_INDICATORS} are recommended"
            ));
        }
        if count > MAX_RECOMMENDED_INDICATORS {
            warnings.push(format!(
                "{count} indicators configured; more than {MAX_RECOMMENDED_INDICATORS} dilutes each one"
            ));
        }

        ConfigValidation {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Partitions candidates into catalog members and unknowns.
    ///
    /// # Errors
    ///
    /// Fails when the model itself is unknown to the catalog.
    pub async fn validate_indicators(
        &self,
        model_id: ModelId,
        candidates: &[IndicatorCode],
    ) -> Result<IndicatorValidationResult, TopsisConfigError> {
        let catalog = self.catalog.list_indicators(model_id).await?;

        let mut seen = HashSet::new();
        let (valid_indicators, invalid_indicators): (Vec<_>, Vec<_>) = candidates
            .iter()
            .filter(|code| seen.insert((*code).clone()))
            .cloned()
            .partition(|code| catalog.contains(code));

        let mut warnings = Vec::new();
        if valid_indicators.len() < MIN_RECOMMENDED_INDICATORS {
            warnings.push(format!(
                "{} valid indicator(s); at least {MIN_RECOMMENDED_INDICATORS} are recommended",
                valid_indicators.len()
            ));
        }
        if valid_indicators.len() > MAX_RECOMMENDED_INDICATORS {
            warnings.push(format!(
                "{} valid indicators; more than {MAX_RECOMMENDED_INDICATORS} dilutes each one",
                valid_indicators.len()
            ));
        }
        if !invalid_indicators.is_empty() {
            warn!(
                model_id = %model_id,
                invalid = ?invalid_indicators,
                "Indicators missing from catalog"
            );
        }

        Ok(IndicatorValidationResult {
            valid: invalid_indicators.is_empty(),
            valid_indicators,
            invalid_indicators,
            warnings,
        })
    }

    /// True when the step carries a decodable TOPSIS configuration.
    pub async fn has_config(&self, model_id: ModelId, step_code: &str) -> Result<bool, TopsisConfigError> {
        Ok(self.get_by_step(model_id, step_code).await?.is_some())
    }

    /// The model's catalog, sorted.
    pub async fn available_indicators(&self, model_id: ModelId) -> Result<Vec<IndicatorCode>, TopsisConfigError> {
        Ok(self
            .catalog
            .list_indicators(model_id)
            .await?
            .into_iter()
            .collect())
    }

    async fn update_step(
        &self,
        step: StepRef,
        indicators: Vec<IndicatorCode>,
        orientation_tag: &str,
    ) -> Result<TopsisConfiguration, TopsisConfigError> {
        let orientation = Orientation::from_tag(orientation_tag.trim())
            .ok_or_else(|| TopsisConfigError::UnknownOrientation(orientation_tag.to_string()))?;

        let output_param = self
            .owned_record(&step)
            .await?
            .map(|record| record.output_param)
            .filter(|param| !param.trim().is_empty())
            .unwrap_or_else(|| self.default_output_param.clone());

        let candidate = TopsisConfiguration {
            step_id: Some(step.step_id),
            algorithm_code: TOPSIS_ALGORITHM_CODE.to_string(),
            indicators,
            output_param,
            orientation,
            original_expression: None,
            model_id: Some(step.model_id),
            step_code: Some(step.step_code.clone()),
        };
        let validation = self.validate(&candidate);
        if !validation.valid {
            return Err(TopsisConfigError::Rejected(validation.errors));
        }

        self.write(&step, orientation, &candidate.indicators, &candidate.output_param)
            .await
    }

    async fn locate(&self, config: &TopsisConfiguration) -> Result<StepRef, TopsisConfigError> {
        let found = match (config.model_id, config.step_code.as_deref(), config.step_id) {
            (Some(model_id), Some(step_code), _) => self.store.resolve_step(model_id, step_code).await?,
            (_, _, Some(step_id)) => self.store.find_step(step_id).await?,
            _ => None,
        };
        let step = found.ok_or_else(|| {
            TopsisConfigError::StepNotFound(
                config
                    .step_code
                    .as_ref()
                    .map(|code| format!("'{code}'"))
                    .or_else(|| config.step_id.map(|id| id.to_string()))
                    .unwrap_or_default(),
            )
        })?;

        if let Some(step_id) = config.step_id {
            if step_id != step.step_id {
                return Err(TopsisConfigError::Rejected(vec![format!(
                    "step id {step_id} does not match step '{}' ({})",
                    step.step_code, step.step_id
                )]));
            }
        }
        Ok(step)
    }

    /// The step's record, refused when another algorithm owns it.
    async fn owned_record(&self, step: &StepRef) -> Result<Option<StoredExpression>, TopsisConfigError> {
        match self.store.get_expression(step.model_id, &step.step_code).await? {
            Some(record) if !is_topsis_tagged(&record.algorithm_code, &record.expression) => {
                warn!(
                    model_id = %step.model_id,
                    step_code = %step.step_code,
                    algorithm_code = %record.algorithm_code,
                    "Refusing to overwrite another algorithm's step"
                );
                Err(TopsisConfigError::ForeignAlgorithm {
                    step_code: step.step_code.clone(),
                    algorithm_code: record.algorithm_code,
                })
            }
            record => Ok(record),
        }
    }

    async fn read(&self, step: &StepRef) -> Result<Option<TopsisConfiguration>, TopsisConfigError> {
        Ok(self
            .store
            .get_expression(step.model_id, &step.step_code)
            .await?
            .and_then(|record| to_configuration(step, &record)))
    }

    async fn write(
        &self,
        step: &StepRef,
        orientation: Orientation,
        indicators: &[IndicatorCode],
        output_param: &str,
    ) -> Result<TopsisConfiguration, TopsisConfigError> {
        let config = TopsisConfiguration {
            step_id: Some(step.step_id),
            algorithm_code: TOPSIS_ALGORITHM_CODE.to_string(),
            indicators: indicators.to_vec(),
            output_param: output_param.to_string(),
            orientation,
            original_expression: None,
            model_id: Some(step.model_id),
            step_code: Some(step.step_code.clone()),
        };
        let expression = config.encoded_expression();

        self.store
            .set_expression(
                step.model_id,
                &step.step_code,
                StoredExpression {
                    algorithm_code: TOPSIS_ALGORITHM_CODE.to_string(),
                    expression: expression.clone(),
                    output_param: config.output_param.clone(),
                },
            )
            .await?;

        info!(
            model_id = %step.model_id,
            step_code = %step.step_code,
            expression = %expression,
            "Stored TOPSIS configuration"
        );
        Ok(TopsisConfiguration {
            original_expression: Some(expression),
            ..config
        })
    }
}

fn to_configuration(step: &StepRef, record: &StoredExpression) -> Option<TopsisConfiguration> {
    TopsisConfiguration::from_expression(
        Some(step.step_id),
        record.algorithm_code.clone(),
        record.output_param.clone(),
        &record.expression,
    )
    .map(|config| config.located_at(step.model_id, step.step_code.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryIndicatorCatalog, InMemoryStepAlgorithmStore};
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::ports::StepExpression;
    use async_trait::async_trait;

    const MODEL: i64 = 1;

    fn model() -> ModelId {
        ModelId::new(MODEL)
    }

    fn codes(list: &[&str]) -> Vec<IndicatorCode> {
        list.iter().map(|c| IndicatorCode::from(*c)).collect()
    }

    async fn setup() -> (TopsisConfigService, Arc<InMemoryStepAlgorithmStore>) {
        let store = Arc::new(InMemoryStepAlgorithmStore::new());
        store.register_step(StepId::new(10), model(), "step_a").await;
        store.register_step(StepId::new(20), model(), "step_b").await;
        store
            .register_step_with(
                StepId::new(30),
                model(),
                "weights",
                StoredExpression {
                    algorithm_code: "WEIGHTED_SUM".to_string(),
                    expression: "sum(a,b)".to_string(),
                    output_param: "w".to_string(),
                },
            )
            .await;

        let catalog = Arc::new(InMemoryIndicatorCatalog::new());
        catalog.set_indicators(model(), ["i1", "i2", "i3"]).await;

        let service = TopsisConfigService::new(store.clone(), catalog, "comprehensive");
        (service, store)
    }

    fn config_for(step_id: i64) -> TopsisConfiguration {
        TopsisConfiguration::new(StepId::new(step_id), ["i1", "i2"], "score", Orientation::Positive)
            .unwrap()
    }

    // ───────────────────────────────────────────────────────────────
    // Create / read
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn create_then_get_by_id_and_location() {
        let (service, store) = setup().await;

        let created = service.create(&config_for(10)).await.unwrap();
        assert_eq!(created.step_code.as_deref(), Some("step_a"));

        let stored = store.get_expression(model(), "step_a").await.unwrap().unwrap();
        assert_eq!(stored.expression, "@TOPSIS_POSITIVE:i1,i2");
        assert_eq!(stored.algorithm_code, TOPSIS_ALGORITHM_CODE);

        let by_id = service.get(StepId::new(10)).await.unwrap().unwrap();
        let by_step = service.get_by_step(model(), "step_a").await.unwrap().unwrap();
        assert_eq!(by_id, by_step);
        assert_eq!(by_id.indicators, codes(&["i1", "i2"]));
        assert_eq!(by_id.output_param, "score");
    }

    #[tokio::test]
    async fn create_by_location() {
        let (service, _) = setup().await;
        let config = config_for(20).located_at(model(), "step_b");

        service.create(&config).await.unwrap();
        assert!(service.has_config(model(), "step_b").await.unwrap());
    }

    #[tokio::test]
    async fn create_rejects_invalid_configuration() {
        let (service, _) = setup().await;
        let mut config = config_for(10);
        config.algorithm_code = "AHP".to_string();

        let err = service.create(&config).await.unwrap_err();
        assert!(matches!(err, TopsisConfigError::Rejected(ref errors) if !errors.is_empty()));
        assert!(!service.has_config(model(), "step_a").await.unwrap());
    }

    #[tokio::test]
    async fn create_twice_is_refused() {
        let (service, _) = setup().await;
        service.create(&config_for(10)).await.unwrap();

        let err = service.create(&config_for(10)).await.unwrap_err();
        assert!(matches!(err, TopsisConfigError::AlreadyConfigured { .. }));
    }

    #[tokio::test]
    async fn create_for_unknown_step_fails() {
        let (service, _) = setup().await;
        let err = service.create(&config_for(99)).await.unwrap_err();
        assert!(matches!(err, TopsisConfigError::StepNotFound(_)));
    }

    #[tokio::test]
    async fn non_topsis_steps_read_as_absent() {
        let (service, _) = setup().await;
        assert!(service.get_by_step(model(), "weights").await.unwrap().is_none());
        assert!(service.get(StepId::new(404)).await.unwrap().is_none());
        assert!(!service.has_config(model(), "weights").await.unwrap());
    }

    // ───────────────────────────────────────────────────────────────
    // Update / delete / list
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn update_keeps_output_param() {
        let (service, store) = setup().await;
        service.create(&config_for(10)).await.unwrap();

        let updated = service
            .update(StepId::new(10), codes(&["i3", "i1"]), "TOPSIS_NEGATIVE")
            .await
            .unwrap();

        assert_eq!(updated.orientation, Orientation::Negative);
        assert_eq!(updated.output_param, "score");
        let stored = store.get_expression(model(), "step_a").await.unwrap().unwrap();
        assert_eq!(stored.expression, "@TOPSIS_NEGATIVE:i3,i1");
    }

    #[tokio::test]
    async fn update_of_unconfigured_step_uses_default_output_param() {
        let (service, _) = setup().await;
        let updated = service
            .update_by_step(model(), "step_b", codes(&["i2"]), "TOPSIS_POSITIVE")
            .await
            .unwrap();
        assert_eq!(updated.output_param, "comprehensive");
    }

    #[tokio::test]
    async fn update_rejects_unknown_tag_and_empty_list() {
        let (service, _) = setup().await;

        let err = service
            .update(StepId::new(10), codes(&["i1"]), "TOPSIS_SIDEWAYS")
            .await
            .unwrap_err();
        assert!(matches!(err, TopsisConfigError::UnknownOrientation(_)));

        let err = service
            .update(StepId::new(10), Vec::new(), "TOPSIS_POSITIVE")
            .await
            .unwrap_err();
        assert!(matches!(err, TopsisConfigError::Rejected(_)));
    }

    #[tokio::test]
    async fn delete_removes_configuration() {
        let (service, _) = setup().await;
        service.create(&config_for(10)).await.unwrap();

        service.delete(model(), "step_a").await.unwrap();
        assert!(!service.has_config(model(), "step_a").await.unwrap());

        let err = service.delete(model(), "step_a").await.unwrap_err();
        assert!(matches!(err, TopsisConfigError::NotConfigured { .. }));
    }

    #[tokio::test]
    async fn list_all_skips_other_algorithms() {
        let (service, _) = setup().await;
        service.create(&config_for(20)).await.unwrap();
        service.create(&config_for(10)).await.unwrap();

        let listed = service.list_all(model()).await.unwrap();
        let steps: Vec<_> = listed.iter().filter_map(|c| c.step_code.as_deref()).collect();
        assert_eq!(steps, vec!["step_a", "step_b"]);
    }

    // ───────────────────────────────────────────────────────────────
    // Steps owned by other algorithms
    // ───────────────────────────────────────────────────────────────

    fn weighted_sum_record() -> StoredExpression {
        StoredExpression {
            algorithm_code: "WEIGHTED_SUM".to_string(),
            expression: "sum(a,b)".to_string(),
            output_param: "w".to_string(),
        }
    }

    #[tokio::test]
    async fn delete_leaves_other_algorithm_intact() {
        let (service, store) = setup().await;

        let err = service.delete(model(), "weights").await.unwrap_err();

        assert!(matches!(err, TopsisConfigError::NotConfigured { ref step_code } if step_code == "weights"));
        assert_eq!(
            store.get_expression(model(), "weights").await.unwrap(),
            Some(weighted_sum_record())
        );
    }

    #[tokio::test]
    async fn create_refuses_other_algorithm_step() {
        let (service, store) = setup().await;

        let err = service.create(&config_for(30)).await.unwrap_err();

        assert!(matches!(
            err,
            TopsisConfigError::ForeignAlgorithm { ref step_code, ref algorithm_code }
                if step_code == "weights" && algorithm_code == "WEIGHTED_SUM"
        ));
        assert_eq!(
            store.get_expression(model(), "weights").await.unwrap(),
            Some(weighted_sum_record())
        );
    }

    #[tokio::test]
    async fn update_refuses_other_algorithm_step() {
        let (service, store) = setup().await;

        let by_id = service
            .update(StepId::new(30), codes(&["i1", "i2"]), "TOPSIS_POSITIVE")
            .await
            .unwrap_err();
        let by_step = service
            .update_by_step(model(), "weights", codes(&["i1"]), "TOPSIS_NEGATIVE")
            .await
            .unwrap_err();

        assert!(matches!(by_id, TopsisConfigError::ForeignAlgorithm { .. }));
        assert!(matches!(by_step, TopsisConfigError::ForeignAlgorithm { .. }));
        assert_eq!(
            store.get_expression(model(), "weights").await.unwrap(),
            Some(weighted_sum_record())
        );
    }

    #[tokio::test]
    async fn legacy_topsis_record_can_be_replaced() {
        let (service, store) = setup().await;
        store
            .set_expression(
                model(),
                "step_a",
                StoredExpression {
                    algorithm_code: "topsis".to_string(),
                    expression: "TOPSIS_POSITIVE:i1".to_string(),
                    output_param: "legacy_score".to_string(),
                },
            )
            .await
            .unwrap();

        let updated = service
            .update_by_step(model(), "step_a", codes(&["i1", "i2"]), "TOPSIS_POSITIVE")
            .await
            .unwrap();

        assert_eq!(updated.output_param, "legacy_score");
        assert!(service.has_config(model(), "step_a").await.unwrap());
    }

    // ───────────────────────────────────────────────────────────────
    // Validation
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn validate_flags_missing_step_id() {
        let (service, _) = setup().await;
        let mut config = config_for(10);
        config.step_id = None;

        let validation = service.validate(&config);
        assert!(!validation.valid);
        assert!(!validation.errors.is_empty());
    }

    #[tokio::test]
    async fn validate_warns_on_indicator_count() {
        let (service, _) = setup().await;
        let single = TopsisConfiguration::new(StepId::new(1), ["i1"], "s", Orientation::Positive).unwrap();
        let many: Vec<String> = (0..11).map(|i| format!("i{i}")).collect();
        let many = TopsisConfiguration::new(StepId::new(1), many, "s", Orientation::Positive).unwrap();

        assert!(service.validate(&single).valid);
        assert_eq!(service.validate(&single).warnings.len(), 1);
        assert_eq!(service.validate(&many).warnings.len(), 1);
    }

    #[tokio::test]
    async fn validate_indicators_partitions_against_catalog() {
        let (service, _) = setup().await;

        let result = service
            .validate_indicators(model(), &codes(&["i1", "bogus", "i3", "i1"]))
            .await
            .unwrap();

        assert!(!result.valid);
        assert_eq!(result.valid_indicators, codes(&["i1", "i3"]));
        assert_eq!(result.invalid_indicators, codes(&["bogus"]));
    }

    #[tokio::test]
    async fn validate_indicators_all_known_is_valid() {
        let (service, _) = setup().await;
        let result = service
            .validate_indicators(model(), &codes(&["i2", "i3"]))
            .await
            .unwrap();
        assert!(result.valid);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn unknown_model_is_a_contract_error() {
        let (service, _) = setup().await;
        let err = service
            .validate_indicators(ModelId::new(404), &codes(&["i1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, TopsisConfigError::Store(ref e) if e.code == ErrorCode::ModelNotFound));
    }

    #[tokio::test]
    async fn available_indicators_are_sorted() {
        let (service, _) = setup().await;
        assert_eq!(
            service.available_indicators(model()).await.unwrap(),
            codes(&["i1", "i2", "i3"])
        );
    }

    // ───────────────────────────────────────────────────────────────
    // Store failures
    // ───────────────────────────────────────────────────────────────

    struct FailingStore;

    #[async_trait]
    impl StepAlgorithmStore for FailingStore {
        async fn resolve_step(&self, model_id: ModelId, step_code: &str) -> Result<Option<StepRef>, DomainError> {
            Ok(Some(StepRef {
                step_id: StepId::new(1),
                model_id,
                step_code: step_code.to_string(),
            }))
        }

        async fn find_step(&self, _step_id: StepId) -> Result<Option<StepRef>, DomainError> {
            Err(DomainError::store("connection reset"))
        }

        async fn get_expression(&self, _: ModelId, _: &str) -> Result<Option<StoredExpression>, DomainError> {
            Ok(None)
        }

        async fn set_expression(&self, _: ModelId, _: &str, _: StoredExpression) -> Result<(), DomainError> {
            Err(DomainError::store("disk full"))
        }

        async fn remove_expression(&self, _: ModelId, _: &str) -> Result<bool, DomainError> {
            Err(DomainError::store("disk full"))
        }

        async fn list_expressions(&self, _: ModelId) -> Result<Vec<StepExpression>, DomainError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn store_failures_surface_as_errors() {
        let service = TopsisConfigService::new(
            Arc::new(FailingStore),
            Arc::new(InMemoryIndicatorCatalog::new()),
            "comprehensive",
        );

        let err = service
            .update_by_step(model(), "s", codes(&["i1", "i2"]), "TOPSIS_POSITIVE")
            .await
            .unwrap_err();
        assert!(matches!(err, TopsisConfigError::Store(ref e) if e.code == ErrorCode::StoreError));
        assert!(!err.errors().is_empty());

        assert!(service.get(StepId::new(1)).await.is_err());
    }
}
