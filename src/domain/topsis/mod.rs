//! TOPSIS module - configuration DSL, calculation, validation and diagnostics.
//!
//! Everything here is pure and synchronous; storage concerns live behind
//! the ports used by the application layer.

mod calculator;
mod configuration;
mod diagnostics;
mod expression;
mod input_check;
mod legacy;
mod orientation;
mod result;
mod statistics;
mod validator;
mod weighted_data;

pub use calculator::{Calculation, CalculationError, CalculatorSettings, TopsisCalculator};
pub use configuration::{is_topsis_tagged, TopsisConfiguration, TOPSIS_ALGORITHM_CODE};
pub use diagnostics::{
    CalculationDetails, CalculationTrace, DiagnosticMetrics, DiagnosticReport, TopsisDiagnostics,
    TraceStage, TraceStep, DIAGNOSTIC_OUTPUT_PARAM,
};
pub use expression::{ExpressionCodec, ExpressionDefect, TopsisExpression, TOPSIS_MARKER};
pub use input_check::{InputDataCheck, EMPTY_INPUT_ISSUE};
pub use legacy::{LegacyExpressionParser, SalvagedExpression};
pub use orientation::{Orientation, TAG_NEGATIVE, TAG_POSITIVE};
pub use result::{closeness, EntityResult, IdealSolution, NEUTRAL_SCORE};
pub use statistics::DistributionStats;
pub use validator::{
    EntityValidationResult, TopsisResultValidator, ValidationResult, ValidationStatistics,
    ValidatorSettings, INVALID_CONFIGURATION_ISSUE,
};
pub use weighted_data::{IndicatorValues, WeightedData};
