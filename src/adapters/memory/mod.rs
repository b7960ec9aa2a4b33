//! In-memory adapters for the step store and the indicator catalog.

mod indicator_catalog;
mod step_algorithm_store;

pub use indicator_catalog::InMemoryIndicatorCatalog;
pub use step_algorithm_store::InMemoryStepAlgorithmStore;
