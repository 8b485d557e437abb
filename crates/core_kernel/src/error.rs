//! Core error types used across the system

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::money::MoneyError;
use crate::numbering::NumberingError;
use crate::ports::PortError;
use crate::temporal::TemporalError;

/// Category of a domain failure
///
/// Every domain error maps onto one of these so that the presentation layer
/// can translate failures without matching on each crate's enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A referenced entity does not exist
    NotFound,
    /// The entity is not in a state that permits the operation
    InvalidStateTransition,
    /// The operation would break a business invariant
    InvariantViolation,
    /// Rate tables are structurally unusable
    MissingReferenceData,
    /// Malformed input
    Validation,
    /// Optimistic-concurrency version mismatch or duplicate key
    Conflict,
    /// Adapter failure
    Infrastructure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidStateTransition => "invalid_state_transition",
            ErrorKind::InvariantViolation => "invariant_violation",
            ErrorKind::MissingReferenceData => "missing_reference_data",
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Infrastructure => "infrastructure",
        };
        f.write_str(name)
    }
}

impl From<&PortError> for ErrorKind {
    fn from(error: &PortError) -> Self {
        match error {
            PortError::NotFound { .. } => ErrorKind::NotFound,
            PortError::Validation { .. } => ErrorKind::Validation,
            PortError::Conflict { .. } => ErrorKind::Conflict,
            PortError::Internal { .. } => ErrorKind::Infrastructure,
        }
    }
}

/// Core error type for the kernel
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    #[error("Numbering error: {0}")]
    Numbering(#[from] NumberingError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
