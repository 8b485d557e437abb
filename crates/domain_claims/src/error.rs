//! Claims domain errors

use thiserror::Error;

use core_kernel::{CoreError, ErrorKind, MoneyError, PortError};

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Policy {0} is not active")]
    PolicyNotActive(String),

    #[error("Claim date {0} is out of coverage period")]
    OutOfCoveragePeriod(String),

    #[error("No expert is assigned to this claim")]
    NoExpertAssigned,

    #[error("Net payable amount must be positive to settle")]
    NothingToSettle,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl ClaimError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClaimError::Validation(message.into())
    }

    pub fn not_found(entity_type: impl Into<String>, id: impl std::fmt::Display) -> Self {
        ClaimError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn invalid_transition(from: impl std::fmt::Debug, to: &str) -> Self {
        ClaimError::InvalidStatusTransition {
            from: format!("{:?}", from),
            to: to.to_string(),
        }
    }

    /// Failure category for the presentation layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClaimError::ClaimNotFound(_) | ClaimError::NotFound { .. } => ErrorKind::NotFound,
            ClaimError::InvalidStatusTransition { .. } | ClaimError::NoExpertAssigned => {
                ErrorKind::InvalidStateTransition
            }
            ClaimError::PolicyNotActive(_)
            | ClaimError::OutOfCoveragePeriod(_)
            | ClaimError::NothingToSettle => ErrorKind::InvariantViolation,
            ClaimError::Validation(_) => ErrorKind::Validation,
            ClaimError::Core(e) => e.kind(),
            ClaimError::Port(e) => ErrorKind::from(e),
        }
    }
}

impl From<MoneyError> for ClaimError {
    fn from(e: MoneyError) -> Self {
        ClaimError::Core(CoreError::from(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ClaimError::OutOfCoveragePeriod("2025-01-01".into()).kind(), ErrorKind::InvariantViolation);
        assert_eq!(ClaimError::invalid_transition("Draft", "Closed").kind(), ErrorKind::InvalidStateTransition);
        assert_eq!(ClaimError::not_found("ThirdParty", "x").kind(), ErrorKind::NotFound);
        assert_eq!(ClaimError::from(PortError::conflict("stale")).kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_out_of_coverage_message() {
        let error = ClaimError::OutOfCoveragePeriod("2026-05-01".into());
        assert!(error.to_string().contains("out of coverage period"));
    }
}
