//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of an evaluation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(i64);

impl ModelId {
    /// Creates a ModelId from its raw database value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ModelId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Identifier of a pipeline step that owns an algorithm configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(i64);

impl StepId {
    /// Step id for configurations built on the fly (diagnostics over raw data)
    /// that are not bound to any persisted pipeline step.
    pub const DETACHED: Self = Self(0);

    /// Creates a StepId from its raw database value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// True for [`StepId::DETACHED`].
    pub fn is_detached(&self) -> bool {
        *self == Self::DETACHED
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StepId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Opaque indicator column name.
///
/// Ordering is lexicographic so indicator maps iterate deterministically;
/// the order that matters for serialization lives in the configuration's
/// indicator list, not here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorCode(String);

impl IndicatorCode {
    /// Creates an indicator code from any string-like value.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the code is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for IndicatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IndicatorCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for IndicatorCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for IndicatorCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for IndicatorCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}
