//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Field '{field}' contains duplicate value '{value}'")]
    Duplicate { field: String, value: String },

    #[error("Field '{field}' must be '{expected}', got '{actual}'")]
    Mismatch {
        field: String,
        expected: String,
        actual: String,
    },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a duplicate value validation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a mismatch validation error.
    pub fn mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ValidationError::Mismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Not found errors
    ModelNotFound,
    StepNotFound,

    // Collaborator errors
    StoreError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ModelNotFound => "MODEL_NOT_FOUND",
            ErrorCode::StepNotFound => "STEP_NOT_FOUND",
            ErrorCode::StoreError => "STORE_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
///
/// Crosses port boundaries: collaborators report their failures with it and
/// the application layer wraps it into service-specific errors.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a store failure error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreError, message)
    }

    /// Creates a model-not-found error.
    pub fn model_not_found(model_id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ModelNotFound, format!("Model {} not found", model_id))
            .with_detail("model_id", model_id.to_string())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
