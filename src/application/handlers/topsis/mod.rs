//! TOPSIS services: configuration, migration and evaluation.

mod config_service;
mod errors;
mod evaluation_service;
mod migration_service;

pub use config_service::{ConfigValidation, IndicatorValidationResult, TopsisConfigService};
pub use errors::{EvaluationError, TopsisConfigError};
pub use evaluation_service::{EvaluationOutcome, TopsisEvaluationService};
pub use migration_service::{
    AppliedChange, CompatibilityReport, MigrationAction, MigrationEntry, MigrationOutcome,
    MigrationPlan, TopsisMigrationService,
};
