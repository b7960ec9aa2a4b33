//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `StepAlgorithmStore` - Raw expression and output param per pipeline step
//! - `IndicatorCatalog` - Indicator codes available to a model

mod indicator_catalog;
mod step_algorithm_store;

pub use indicator_catalog::IndicatorCatalog;
pub use step_algorithm_store::{StepAlgorithmStore, StepExpression, StepRef, StoredExpression};
