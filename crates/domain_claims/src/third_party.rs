//! Third parties involved in a motor claim

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::ThirdPartyId;

use crate::error::ClaimError;

/// Caller-supplied third-party details, used for both add and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdPartyDetails {
    pub full_name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub vehicle_registration: Option<String>,
    pub insurance_company: Option<String>,
    pub policy_number: Option<String>,
    pub is_at_fault: bool,
    /// 0 to 100; no constraint across the parties of one claim
    pub fault_percentage: Option<Decimal>,
    pub damage_description: Option<String>,
}

impl ThirdPartyDetails {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..Default::default()
        }
    }

    pub fn at_fault(mut self, percentage: Decimal) -> Self {
        self.is_at_fault = true;
        self.fault_percentage = Some(percentage);
        self
    }

    pub fn validate(&self) -> Result<(), ClaimError> {
        if self.full_name.trim().is_empty() {
            return Err(ClaimError::validation("third party name is required"));
        }
        if let Some(pct) = self.fault_percentage {
            if pct < Decimal::ZERO || pct > dec!(100) {
                return Err(ClaimError::validation(format!(
                    "fault percentage {} is outside 0-100",
                    pct
                )));
            }
        }
        Ok(())
    }
}

/// A third party recorded on a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdParty {
    pub id: ThirdPartyId,
    #[serde(flatten)]
    pub details: ThirdPartyDetails,
}

impl ThirdParty {
    pub fn new(details: ThirdPartyDetails) -> Self {
        Self {
            id: ThirdPartyId::new_v7(),
            details,
        }
    }
}
