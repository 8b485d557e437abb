//! Ports and Adapters Infrastructure
//!
//! The lifecycle services depend only on the traits in this module; adapters
//! (in-memory for tests and embedding, a database elsewhere) implement them.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │        QuoteService / PolicyService / ClaimService    │
//! └──────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌──────────────────────────────────────────────────────┐
//! │  RecordStore<R>   SequenceGenerator   lookup ports    │
//! └──────────────────────────────────────────────────────┘
//!                          ▲
//!                          │
//!               ┌──────────┴──────────┐
//!               │  infra_store (memory)│
//!               └─────────────────────┘
//! ```
//!
//! # Concurrency
//!
//! Every stored record carries a version. `RecordStore::update` is a
//! compare-and-swap on that version: the caller passes the record as it read
//! it (plus its changes) and the store refuses the write with
//! [`PortError::Conflict`] if someone else updated the record in between.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use thiserror::Error;

use crate::numbering::{DocumentKind, DocumentNumber, NumberingPeriod};
use crate::temporal::{Clock, Timezone};

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The adapter rejected the input
    #[error("Validation error: {message}")]
    Validation {
        message: String,
    },

    /// Duplicate key or stale version
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// An internal adapter error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits extend this marker so they can be shared across tasks.
pub trait DomainPort: Send + Sync + 'static {}

/// An aggregate that can be kept in a [`RecordStore`]
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Copy + Eq + Hash + fmt::Display + Send + Sync + 'static;

    /// Entity name used in error messages
    const ENTITY: &'static str;

    fn record_id(&self) -> Self::Id;

    /// Version last written by the store; zero before the first insert
    fn version(&self) -> u64;

    fn set_version(&mut self, version: u64);
}

/// Keyed record store with single-record atomicity
#[async_trait]
pub trait RecordStore<R: Record>: DomainPort {
    /// Fetches a record by id
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` if no record has this id
    async fn get(&self, id: R::Id) -> Result<R, PortError>;

    async fn list_all(&self) -> Result<Vec<R>, PortError>;

    /// Returns every record matching `predicate`, in no particular order
    async fn list_where(
        &self,
        predicate: &(dyn for<'r> Fn(&'r R) -> bool + Send + Sync),
    ) -> Result<Vec<R>, PortError>;

    /// Inserts a new record and returns it with version 1
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` if the id is already taken
    async fn insert(&self, record: R) -> Result<R, PortError>;

    /// Replaces a record if its version still matches the stored one
    ///
    /// Returns the record with its version incremented.
    ///
    /// # Errors
    ///
    /// * `PortError::NotFound` if the record does not exist
    /// * `PortError::Conflict` if the stored version differs from `record.version()`
    async fn update(&self, record: R) -> Result<R, PortError>;

    async fn delete(&self, id: R::Id) -> Result<(), PortError>;

    /// Returns the first record matching `predicate`, if any
    async fn find_first(
        &self,
        predicate: &(dyn for<'r> Fn(&'r R) -> bool + Send + Sync),
    ) -> Result<Option<R>, PortError> {
        Ok(self.list_where(predicate).await?.into_iter().next())
    }
}

/// Monotonic counter per (document kind, calendar month)
///
/// Implementations must serialize allocation so two callers never receive
/// the same value for the same key.
#[async_trait]
pub trait SequenceGenerator: DomainPort {
    /// Returns the next value, starting at 1 for a fresh period
    async fn next_value(
        &self,
        kind: DocumentKind,
        period: NumberingPeriod,
    ) -> Result<u32, PortError>;

    /// Allocates and formats the next document number
    async fn next_number(
        &self,
        kind: DocumentKind,
        period: NumberingPeriod,
    ) -> Result<DocumentNumber, PortError> {
        let sequence = self.next_value(kind, period).await?;
        Ok(DocumentNumber::new(kind, period, sequence))
    }
}

/// Numbering and time collaborators shared by the lifecycle services
#[derive(Clone)]
pub struct ServiceContext {
    sequences: Arc<dyn SequenceGenerator>,
    clock: Arc<dyn Clock>,
    timezone: Timezone,
}

impl ServiceContext {
    pub fn new(sequences: Arc<dyn SequenceGenerator>, clock: Arc<dyn Clock>, timezone: Timezone) -> Self {
        Self {
            sequences,
            clock,
            timezone,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Business date of `instant`
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.timezone.local_date(instant)
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    /// Allocates the next number of `kind` for the month containing `now`
    pub async fn next_number(
        &self,
        kind: DocumentKind,
        now: DateTime<Utc>,
    ) -> Result<DocumentNumber, PortError> {
        let period = NumberingPeriod::containing(now, &self.timezone);
        self.sequences.next_number(kind, period).await
    }
}

impl fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContext")
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}
