//! Ports consumed by the claim lifecycle
//!
//! Claims reference a policy but do not depend on the policy crate: the
//! lifecycle only needs a small read model of the insured policy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, DateRange, DomainPort, PolicyId, PortError};

/// What a claim needs to know about the policy it is declared against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuredPolicy {
    pub policy_id: PolicyId,
    pub policy_number: String,
    pub client_id: ClientId,
    /// True only for a stored `Active` status
    pub is_active: bool,
    pub coverage_period: DateRange,
    pub vehicle_registration: String,
}

/// Read-only policy lookup
#[async_trait]
pub trait PolicyLookupPort: DomainPort {
    /// Fetches the insured policy
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` if the policy does not exist
    async fn get_policy(&self, id: PolicyId) -> Result<InsuredPolicy, PortError>;
}
