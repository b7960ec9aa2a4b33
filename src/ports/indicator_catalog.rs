//! IndicatorCatalog port - Indicators a model's data sources provide.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::domain::foundation::{DomainError, IndicatorCode, ModelId};

/// Port for listing the indicator codes available to a model.
#[async_trait]
pub trait IndicatorCatalog: Send + Sync {
    /// Lists the model's indicators.
    ///
    /// An unknown model is a caller error and fails with `ModelNotFound`;
    /// a known model without indicators yields an empty set.
    async fn list_indicators(&self, model_id: ModelId) -> Result<BTreeSet<IndicatorCode>, DomainError>;
}
