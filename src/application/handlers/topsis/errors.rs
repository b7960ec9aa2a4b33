//! Errors raised by the TOPSIS application services.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ModelId};
use crate::domain::topsis::CalculationError;

/// Failures of configuration store operations.
#[derive(Debug, Clone, Error)]
pub enum TopsisConfigError {
    #[error("configuration rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),

    #[error("step {0} not found")]
    StepNotFound(String),

    #[error("step '{step_code}' has no TOPSIS configuration")]
    NotConfigured { step_code: String },

    #[error("step '{step_code}' already has a TOPSIS configuration")]
    AlreadyConfigured { step_code: String },

    #[error("step '{step_code}' belongs to algorithm '{algorithm_code}'")]
    ForeignAlgorithm {
        step_code: String,
        algorithm_code: String,
    },

    #[error("unknown orientation tag '{0}'")]
    UnknownOrientation(String),

    #[error("store failure: {0}")]
    Store(#[from] DomainError),
}

impl TopsisConfigError {
    /// Error list for callers that expect one on every failed write.
    pub fn errors(&self) -> Vec<String> {
        match self {
            TopsisConfigError::Rejected(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Failures of an evaluation run.
#[derive(Debug, Clone, Error)]
pub enum EvaluationError {
    #[error("model {model_id} step '{step_code}' has no usable TOPSIS configuration")]
    ConfigurationMissing { model_id: ModelId, step_code: String },

    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error(transparent)]
    Config(#[from] TopsisConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_lists_every_error() {
        let err = TopsisConfigError::Rejected(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "configuration rejected: a; b");
        assert_eq!(err.errors().len(), 2);
    }

    #[test]
    fn other_errors_become_single_entry_list() {
        let err = TopsisConfigError::UnknownOrientation("TOPSIS_UP".to_string());
        assert_eq!(err.errors(), vec!["unknown orientation tag 'TOPSIS_UP'".to_string()]);
    }
}
