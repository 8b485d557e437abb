//! Motor Rating Domain
//!
//! Turns vehicle, coverage, discount, duration and distributor inputs into an
//! itemized premium breakdown. Everything in this crate is pure: the engine
//! reads [`RateTables`] and never touches a store.
//!
//! # Rating steps
//!
//! ```text
//! vehicle value × rating factor        -> base premium
//! + sum of selected coverage premiums  -> subtotal
//! − professional/commercial discounts  -> net before short term
//! × short-term coefficient             -> net premium
//! + motor tax + policy cost            -> total premium
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_rating::{RatingEngine, RatingRequest, FuelType};
//!
//! let engine = RatingEngine::with_defaults();
//! let breakdown = engine.calculate(&RatingRequest::new(vehicle_value, 9, FuelType::Essence, 12))?;
//! assert_eq!(breakdown.total_premium.amount(), dec!(174750));
//! ```

pub mod reference;
pub mod tables;
pub mod engine;
pub mod tax;
pub mod commission;
pub mod error;

pub use reference::{Distributor, DistributorType, FuelType, MotorCoverage, ProductType};
pub use tables::{
    CommissionRate, PolicyCostBracket, ProductTaxRate, RateTables, RatingFactor, ShortTermFactor,
};
pub use engine::{CoveragePremium, PremiumBreakdown, RatingEngine, RatingRequest, RatingSettings};
pub use tax::{TaxBreakdown, TaxCalculator, TaxLine};
pub use commission::{CommissionBreakdown, CommissionCalculator};
pub use error::RatingError;
