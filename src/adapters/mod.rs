//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - In-memory step store and indicator catalog
//! - `file` - Weighted data loading from JSON/YAML files

pub mod file;
pub mod memory;

pub use file::{DataFormat, LoadError, WeightedDataLoader};
pub use memory::{InMemoryIndicatorCatalog, InMemoryStepAlgorithmStore};
