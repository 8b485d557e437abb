//! Core Kernel - Foundational types for the motor insurance core
//!
//! This crate provides the building blocks shared by the rating, policy and
//! claims domains:
//! - Money types with precise decimal arithmetic (no binary floating point)
//! - Temporal helpers: coverage date ranges, business time zone, injectable clock
//! - Strongly-typed identifiers and human-readable document numbers
//! - Port traits for record stores and sequence generators

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod numbering;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{Clock, DateRange, ManualClock, SystemClock, TemporalError, Timezone};
pub use identifiers::{
    QuoteId, PolicyId, PolicyCoverageId, EndorsementId, ClaimId, ClaimDocumentId,
    ThirdPartyId, ClaimHistoryId, ClientId, DistributorId, ProductId, CoverageId,
    VehicleCategoryId, VehicleMakeId, VehicleModelId,
};
pub use numbering::{DocumentKind, DocumentNumber, NumberingError, NumberingPeriod};
pub use ports::{DomainPort, PortError, Record, RecordStore, SequenceGenerator, ServiceContext};
pub use error::{CoreError, ErrorKind};
