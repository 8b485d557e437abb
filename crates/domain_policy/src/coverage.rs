//! Coverages held by a policy
//!
//! A policy coverage is a snapshot of a catalogue entry taken when the
//! coverage was bound, either at conversion from the quote or by an
//! endorsement. Removing a coverage deactivates it; the row is kept.

use serde::{Deserialize, Serialize};

use core_kernel::{CoverageId, Currency, Money, PolicyCoverageId};
use domain_rating::{CoveragePremium, MotorCoverage};

/// A coverage bound to a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCoverage {
    pub id: PolicyCoverageId,
    /// Catalogue entry this row was taken from
    pub coverage_id: CoverageId,
    pub code: String,
    pub name: String,
    pub premium_amount: Money,
    pub is_active: bool,
}

impl PolicyCoverage {
    /// Binds a coverage priced by the rating engine
    pub fn from_rated(rated: &CoveragePremium) -> Self {
        Self {
            id: PolicyCoverageId::new_v7(),
            coverage_id: rated.coverage_id,
            code: rated.code.clone(),
            name: rated.name.clone(),
            premium_amount: rated.premium_amount,
            is_active: true,
        }
    }

    /// Binds a catalogue entry at its fixed premium
    pub fn from_catalogue(coverage: &MotorCoverage, currency: Currency) -> Self {
        Self {
            id: PolicyCoverageId::new_v7(),
            coverage_id: coverage.id,
            code: coverage.code.clone(),
            name: coverage.name.clone(),
            premium_amount: Money::new(coverage.fixed_premium, currency),
            is_active: true,
        }
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
