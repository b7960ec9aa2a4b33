//! File-backed adapters.

mod weighted_data_loader;

pub use weighted_data_loader::{DataFormat, LoadError, WeightedDataLoader};
