//! Bridges the policy store to the claims lookup port

use std::sync::Arc;

use async_trait::async_trait;

use core_kernel::{DomainPort, PolicyId, PortError, RecordStore};
use domain_claims::{InsuredPolicy, PolicyLookupPort};
use domain_policy::{Policy, PolicyStatus};

/// `PolicyLookupPort` reading straight from the policy record store
#[derive(Clone)]
pub struct PolicyStoreLookup {
    policies: Arc<dyn RecordStore<Policy>>,
}

impl PolicyStoreLookup {
    pub fn new(policies: Arc<dyn RecordStore<Policy>>) -> Self {
        Self { policies }
    }
}

impl std::fmt::Debug for PolicyStoreLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyStoreLookup").finish_non_exhaustive()
    }
}

impl DomainPort for PolicyStoreLookup {}

#[async_trait]
impl PolicyLookupPort for PolicyStoreLookup {
    async fn get_policy(&self, id: PolicyId) -> Result<InsuredPolicy, PortError> {
        let policy = self.policies.get(id).await?;
        Ok(InsuredPolicy {
            policy_id: policy.id(),
            policy_number: policy.policy_number().to_string(),
            client_id: policy.client_id(),
            is_active: policy.status() == PolicyStatus::Active,
            coverage_period: policy.coverage_period(),
            vehicle_registration: policy.vehicle().registration_number.clone(),
        })
    }
}
