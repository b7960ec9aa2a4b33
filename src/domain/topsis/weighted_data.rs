//! Weighted indicator data - the calculator's input.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::IndicatorCode;

/// Indicator values of one entity. `None` marks a value the source left null.
pub type IndicatorValues = BTreeMap<IndicatorCode, Option<f64>>;

/// Entity code → indicator values, as delivered by upstream weighting.
///
/// Both levels may be incomplete: an entity can map to `None` (no data at
/// all) and an indicator can map to `None`, NaN or an infinity. None of
/// these are rejected here; they are data-quality defects reported by the
/// input check and the validator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightedData {
    entities: BTreeMap<String, Option<IndicatorValues>>,
}

impl WeightedData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity with finite values.
    pub fn with_entity<'a>(
        mut self,
        entity: impl Into<String>,
        values: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Self {
        let values = values
            .into_iter()
            .map(|(code, value)| (IndicatorCode::from(code), Some(value)))
            .collect();
        self.entities.insert(entity.into(), Some(values));
        self
    }

    /// Adds an entity whose data map is absent.
    pub fn with_missing_entity(mut self, entity: impl Into<String>) -> Self {
        self.entities.insert(entity.into(), None);
        self
    }

    /// Sets one value, creating the entity's map if needed.
    pub fn insert_value(
        &mut self,
        entity: impl Into<String>,
        indicator: impl Into<IndicatorCode>,
        value: Option<f64>,
    ) {
        self.entities
            .entry(entity.into())
            .or_insert_with(|| Some(BTreeMap::new()))
            .get_or_insert_with(BTreeMap::new)
            .insert(indicator.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of entities, including those without data.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Entities in code order.
    pub fn entities(&self) -> impl Iterator<Item = (&str, Option<&IndicatorValues>)> {
        self.entities
            .iter()
            .map(|(code, values)| (code.as_str(), values.as_ref()))
    }

    /// The value of one indicator for one entity, if present and finite.
    pub fn finite_value(&self, entity: &str, indicator: &str) -> Option<f64> {
        self.entities
            .get(entity)?
            .as_ref()?
            .get(indicator)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    }

    /// Union of indicator codes across all entities.
    pub fn observed_indicators(&self) -> BTreeSet<IndicatorCode> {
        self.entities
            .values()
            .flatten()
            .flat_map(|values| values.keys().cloned())
            .collect()
    }
}
