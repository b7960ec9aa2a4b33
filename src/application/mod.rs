//! Application layer - Services over the TOPSIS domain.
//!
//! This layer resolves configurations through the ports, runs the pure
//! domain components, and writes back through the store.

pub mod handlers;

pub use handlers::{
    EvaluationError, EvaluationOutcome, TopsisConfigError, TopsisConfigService,
    TopsisEvaluationService, TopsisMigrationService,
};
