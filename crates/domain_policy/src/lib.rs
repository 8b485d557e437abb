//! Quote and Policy Domain
//!
//! This crate implements the motor quote and policy lifecycles, following the
//! same aggregate/port split as the rest of the workspace:
//! - **Aggregates**: `Quote` and `Policy` (which owns its coverages and endorsements)
//! - **Ports**: `ReferenceDataPort` plus the kernel's record store and sequence ports
//! - **Services**: `QuoteService`, `PolicyService`
//! - **Domain Events**: QuoteGenerated, PolicyIssued, EndorsementApplied, ...
//!
//! # Lifecycle
//!
//! ```text
//! Quote:  Generated -> Accepted -> converted into a Policy
//!                   \-> Rejected
//!
//! Policy: Draft -> Active -> Suspended
//!             \--------\---------\-> Cancelled
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let quote = quote_service.create(request).await?;
//! quote_service.accept(quote.id()).await?;
//! let policy = policy_service.convert_from_quote(quote.id()).await?;
//! policy_service.activate(policy.id(), "PAY-2025-001").await?;
//! ```

pub mod quote;
pub mod aggregate;
pub mod coverage;
pub mod endorsement;
pub mod events;
pub mod error;
pub mod ports;
pub mod services;

pub use quote::{Quote, QuoteRequest, QuoteStatus, VehicleDetails};
pub use aggregate::{EndorsementDetails, EndorsementEffect, Policy, PolicyStatus, PremiumDelta};
pub use coverage::PolicyCoverage;
pub use endorsement::{
    Endorsement, EndorsementChange, EndorsementPricing, EndorsementRequest, EndorsementSettings,
    EndorsementType,
};
pub use events::PolicyEvent;
pub use error::PolicyError;
pub use ports::ReferenceDataPort;
pub use services::{PolicyService, QuoteService, QuoteSettings};
