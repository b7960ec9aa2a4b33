//! Application handlers.
//!
//! Services that orchestrate domain operations over the ports.

pub mod topsis;

pub use topsis::{
    // Services
    TopsisConfigService,
    TopsisEvaluationService,
    TopsisMigrationService,
    // Results
    AppliedChange,
    CompatibilityReport,
    ConfigValidation,
    EvaluationOutcome,
    IndicatorValidationResult,
    MigrationAction,
    MigrationEntry,
    MigrationOutcome,
    MigrationPlan,
    // Errors
    EvaluationError,
    TopsisConfigError,
};
