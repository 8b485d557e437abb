//! Policy endorsements (avenants)
//!
//! An endorsement is the formal record of a change to a policy. Endorsements
//! are append-only: once created they are never modified or deleted.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{CoverageId, DocumentNumber, EndorsementId, Money, PolicyId};

/// Kinds of endorsement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndorsementType {
    AddCoverage,
    RemoveCoverage,
    ChangeVehicleValue,
    /// Written by `suspend`
    Suspension,
    /// Written by `cancel`
    Cancellation,
}

impl fmt::Display for EndorsementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The change a caller asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndorsementChange {
    AddCoverage {
        coverage_ids: Vec<CoverageId>,
    },
    RemoveCoverage {
        coverage_ids: Vec<CoverageId>,
    },
    ChangeVehicleValue {
        new_value: Money,
    },
}

impl EndorsementChange {
    pub fn endorsement_type(&self) -> EndorsementType {
        match self {
            EndorsementChange::AddCoverage { .. } => EndorsementType::AddCoverage,
            EndorsementChange::RemoveCoverage { .. } => EndorsementType::RemoveCoverage,
            EndorsementChange::ChangeVehicleValue { .. } => EndorsementType::ChangeVehicleValue,
        }
    }
}

/// Input to `PolicyService::create_endorsement`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorsementRequest {
    pub change: EndorsementChange,
    pub effective_date: NaiveDate,
    pub description: String,
    pub reason: Option<String>,
}

impl EndorsementRequest {
    pub fn new(change: EndorsementChange, effective_date: NaiveDate) -> Self {
        Self {
            change,
            effective_date,
            description: String::new(),
            reason: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// How coverage endorsements are priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndorsementPricing {
    /// A fixed amount per add/remove endorsement
    Flat,
    /// Difference between engine totals for the old and new coverage sets
    #[default]
    Rerate,
}

/// Endorsement pricing parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndorsementSettings {
    pub pricing: EndorsementPricing,
    /// Used by `EndorsementPricing::Flat`
    pub flat_coverage_amount: Decimal,
    /// Fraction of the vehicle value change charged (or refunded)
    pub vehicle_value_rate: Decimal,
}

impl Default for EndorsementSettings {
    fn default() -> Self {
        Self {
            pricing: EndorsementPricing::Rerate,
            flat_coverage_amount: dec!(5000),
            vehicle_value_rate: dec!(0.025),
        }
    }
}

/// An endorsement record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
    pub id: EndorsementId,
    pub policy_id: PolicyId,
    /// `AVE-YYYY-MM-NNNN`
    pub endorsement_number: DocumentNumber,
    pub endorsement_type: EndorsementType,
    pub description: String,
    /// Signed
    pub premium_adjustment: Money,
    pub new_total_premium: Money,
    pub effective_date: NaiveDate,
    pub endorsement_date: DateTime<Utc>,
    pub reason: Option<String>,
}

impl Endorsement {
    /// Returns true if the endorsement raised the premium
    pub fn requires_additional_premium(&self) -> bool {
        self.premium_adjustment.is_positive()
    }

    /// Returns true if the change took effect before it was recorded
    pub fn is_retroactive(&self) -> bool {
        self.effective_date < self.endorsement_date.date_naive()
    }
}
