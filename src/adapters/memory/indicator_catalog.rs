//! In-memory indicator catalog.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, IndicatorCode, ModelId};
use crate::ports::IndicatorCatalog;

/// In-memory implementation of the IndicatorCatalog port.
#[derive(Default)]
pub struct InMemoryIndicatorCatalog {
    models: RwLock<HashMap<ModelId, BTreeSet<IndicatorCode>>>,
}

impl InMemoryIndicatorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the indicator set of a model, registering the model if new.
    pub async fn set_indicators<I, S>(&self, model_id: ModelId, indicators: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<IndicatorCode>,
    {
        let codes = indicators.into_iter().map(Into::into).collect();
        self.models.write().await.insert(model_id, codes);
    }
}

#[async_trait]
impl IndicatorCatalog for InMemoryIndicatorCatalog {
    async fn list_indicators(&self, model_id: ModelId) -> Result<BTreeSet<IndicatorCode>, DomainError> {
        self.models
            .read()
            .await
            .get(&model_id)
            .cloned()
            .ok_or_else(|| DomainError::model_not_found(model_id))
    }
}
