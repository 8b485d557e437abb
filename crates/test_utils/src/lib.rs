//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! motor insurance test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data (amounts, dates, vehicles)
//! - `builders`: Builders for quote and claim requests
//! - `harness`: Services wired to in-memory adapters and a manual clock
//! - `assertions`: Assertion helpers for money, breakdowns and error kinds
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod harness;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use harness::*;
pub use assertions::*;
pub use generators::*;
