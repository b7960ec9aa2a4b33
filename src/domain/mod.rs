//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `topsis` - Expression codec, calculator, validator and diagnostics
//!   for TOPSIS scoring

pub mod foundation;
pub mod topsis;
