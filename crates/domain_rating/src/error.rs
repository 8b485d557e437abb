//! Rating domain errors

use thiserror::Error;

use core_kernel::{CoreError, ErrorKind, MoneyError};

/// Errors that can occur while rating
#[derive(Debug, Error)]
pub enum RatingError {
    /// Request input is outside the accepted domain
    #[error("Invalid rating input: {0}")]
    InvalidInput(String),

    /// Rate tables are structurally unusable (overlaps, non-positive coefficients)
    #[error("Invalid rate table: {0}")]
    InvalidRateTable(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl RatingError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        RatingError::InvalidInput(message.into())
    }

    pub fn invalid_table(message: impl Into<String>) -> Self {
        RatingError::InvalidRateTable(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RatingError::InvalidInput(_) => ErrorKind::Validation,
            RatingError::InvalidRateTable(_) => ErrorKind::MissingReferenceData,
            RatingError::Core(e) => e.kind(),
        }
    }
}

impl From<MoneyError> for RatingError {
    fn from(error: MoneyError) -> Self {
        RatingError::Core(CoreError::Money(error))
    }
}
