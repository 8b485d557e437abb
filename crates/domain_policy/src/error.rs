//! Policy domain errors
//!
//! This module defines all error types that can occur within quoting and
//! policy administration.

use thiserror::Error;

use core_kernel::{CoreError, ErrorKind, MoneyError, PortError, QuoteId};
use domain_rating::RatingError;

/// Errors that can occur in the policy domain
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Invalid state transition attempted
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: String,
        to: String,
    },

    /// Quote validity period is over
    #[error("Quote has expired")]
    QuoteExpired,

    /// A policy already exists for this quote
    #[error("Quote {quote_id} has already been converted to a policy")]
    AlreadyConverted {
        quote_id: QuoteId,
    },

    /// A referenced entity does not exist
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Rating(#[from] RatingError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl PolicyError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PolicyError::Validation(message.into())
    }

    pub fn not_found(entity_type: impl Into<String>, id: impl std::fmt::Display) -> Self {
        PolicyError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn invalid_transition(from: impl std::fmt::Debug, to: &str) -> Self {
        PolicyError::InvalidStateTransition {
            from: format!("{:?}", from),
            to: to.to_string(),
        }
    }

    /// Failure category for the presentation layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            PolicyError::InvalidStateTransition { .. } | PolicyError::QuoteExpired => {
                ErrorKind::InvalidStateTransition
            }
            PolicyError::AlreadyConverted { .. } | PolicyError::InvariantViolation(_) => {
                ErrorKind::InvariantViolation
            }
            PolicyError::NotFound { .. } => ErrorKind::NotFound,
            PolicyError::Validation(_) => ErrorKind::Validation,
            PolicyError::Rating(e) => e.kind(),
            PolicyError::Core(e) => e.kind(),
            PolicyError::Port(e) => ErrorKind::from(e),
        }
    }
}

impl From<MoneyError> for PolicyError {
    fn from(error: MoneyError) -> Self {
        PolicyError::Core(CoreError::Money(error))
    }
}
