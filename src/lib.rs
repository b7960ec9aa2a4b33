//! TOPSIS Evaluator - Closeness scoring of entities over weighted indicators
//!
//! This crate stores TOPSIS step configurations as compact expressions,
//! computes ideal solutions and closeness scores, validates and repairs
//! results, and diagnoses or migrates stored configurations.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
