//! Claim lifecycle service

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use core_kernel::{
    ClaimDocumentId, ClaimId, ClientId, DocumentKind, DocumentNumber, PolicyId, RecordStore,
    ServiceContext, ThirdPartyId,
};

use crate::claim::{Approval, Claim, ClaimRequest, ClaimUpdate, ExpertAssignment, Expertise, Settlement};
use crate::documents::{ClaimDocument, NewDocument};
use crate::error::ClaimError;
use crate::history::ClaimHistory;
use crate::ports::PolicyLookupPort;
use crate::third_party::{ThirdParty, ThirdPartyDetails};
use crate::workflow::ClaimStatus;

/// Who performs an operation; recorded in the claim history
pub type Actor<'a> = Option<&'a str>;

fn newest_first(mut claims: Vec<Claim>) -> Vec<Claim> {
    claims.sort_by(|a, b| b.reported_date().cmp(&a.reported_date()));
    claims
}

/// Service driving claims from declaration to closure
///
/// Every mutating operation loads the claim, lets the aggregate check the
/// transition, and writes it back with a version check.
pub struct ClaimService {
    claims: Arc<dyn RecordStore<Claim>>,
    policies: Arc<dyn PolicyLookupPort>,
    context: ServiceContext,
}

impl ClaimService {
    pub fn new(
        claims: Arc<dyn RecordStore<Claim>>,
        policies: Arc<dyn PolicyLookupPort>,
        context: ServiceContext,
    ) -> Self {
        Self {
            claims,
            policies,
            context,
        }
    }

    /// Declares a claim against an active policy
    ///
    /// # Errors
    ///
    /// * `NotFound` if the policy does not exist
    /// * `ClaimError::PolicyNotActive` if the policy is not active
    /// * `ClaimError::OutOfCoveragePeriod` if the loss date is outside the coverage period
    pub async fn create(&self, request: ClaimRequest, actor: Actor<'_>) -> Result<Claim, ClaimError> {
        let policy = self.policies.get_policy(request.policy_id).await?;
        if !policy.is_active {
            return Err(ClaimError::PolicyNotActive(policy.policy_number));
        }
        if !policy.coverage_period.contains(request.claim_date) {
            return Err(ClaimError::OutOfCoveragePeriod(request.claim_date.to_string()));
        }

        let now = self.context.now();
        let number = self.context.next_number(DocumentKind::Claim, now).await?;
        let claim = Claim::open(number, request, &policy, actor, now)?;
        let claim = self.claims.insert(claim).await?;

        info!(
            claim_id = %claim.id(),
            claim_number = %claim.claim_number(),
            policy_number = %claim.policy_number(),
            claimed_amount = %claim.claimed_amount(),
            "Claim declared"
        );
        Ok(claim)
    }

    /// Loads, mutates and stores a claim
    async fn modify<T>(
        &self,
        id: ClaimId,
        operation: &str,
        mutate: impl FnOnce(&mut Claim, DateTime<Utc>) -> Result<T, ClaimError>,
    ) -> Result<(Claim, T), ClaimError> {
        let mut claim = self.claims.get(id).await?;
        let before = claim.status();
        let output = mutate(&mut claim, self.context.now())?;
        let claim = self.claims.update(claim).await?;

        if before != claim.status() {
            info!(
                claim_number = %claim.claim_number(),
                from = %before,
                status = %claim.status(),
                "Claim {}", operation
            );
        } else {
            debug!(claim_number = %claim.claim_number(), operation, "Claim updated");
        }
        Ok((claim, output))
    }

    pub async fn submit(&self, id: ClaimId, actor: Actor<'_>) -> Result<Claim, ClaimError> {
        let (claim, _) = self.modify(id, "submitted", |c, now| c.submit(actor, now)).await?;
        Ok(claim)
    }

    pub async fn start_review(&self, id: ClaimId, actor: Actor<'_>) -> Result<Claim, ClaimError> {
        let (claim, _) = self
            .modify(id, "under review", |c, now| c.start_review(actor, now))
            .await?;
        Ok(claim)
    }

    pub async fn assign_expert(
        &self,
        id: ClaimId,
        assignment: ExpertAssignment,
        actor: Actor<'_>,
    ) -> Result<Claim, ClaimError> {
        let (claim, _) = self
            .modify(id, "assigned to expert", |c, now| c.assign_expert(assignment, actor, now))
            .await?;
        Ok(claim)
    }

    pub async fn submit_expertise(
        &self,
        id: ClaimId,
        expertise: Expertise,
        actor: Actor<'_>,
    ) -> Result<Claim, ClaimError> {
        let (claim, _) = self
            .modify(id, "expertise submitted", |c, now| c.submit_expertise(expertise, actor, now))
            .await?;
        Ok(claim)
    }

    pub async fn approve(&self, id: ClaimId, approval: Approval, actor: Actor<'_>) -> Result<Claim, ClaimError> {
        let (claim, _) = self
            .modify(id, "approved", |c, now| c.approve(approval, actor, now))
            .await?;
        Ok(claim)
    }

    pub async fn reject(
        &self,
        id: ClaimId,
        reason: &str,
        comments: Option<String>,
        actor: Actor<'_>,
    ) -> Result<Claim, ClaimError> {
        let (claim, _) = self
            .modify(id, "rejected", |c, now| c.reject(reason, comments, actor, now))
            .await?;
        Ok(claim)
    }

    pub async fn settle(&self, id: ClaimId, settlement: Settlement, actor: Actor<'_>) -> Result<Claim, ClaimError> {
        let (claim, _) = self
            .modify(id, "settled", |c, now| c.settle(settlement, actor, now))
            .await?;
        Ok(claim)
    }

    pub async fn close(&self, id: ClaimId, actor: Actor<'_>) -> Result<Claim, ClaimError> {
        let (claim, _) = self.modify(id, "closed", |c, now| c.close(actor, now)).await?;
        Ok(claim)
    }

    /// Edits a draft claim; the new loss date is checked against the policy period
    pub async fn update_claim(&self, id: ClaimId, update: ClaimUpdate, actor: Actor<'_>) -> Result<Claim, ClaimError> {
        let current = self.claims.get(id).await?;
        let policy = self.policies.get_policy(current.policy_id()).await?;
        let (claim, _) = self
            .modify(id, "updated", |c, now| c.update(update, &policy.coverage_period, actor, now))
            .await?;
        Ok(claim)
    }

    pub async fn add_third_party(
        &self,
        id: ClaimId,
        details: ThirdPartyDetails,
        actor: Actor<'_>,
    ) -> Result<ThirdParty, ClaimError> {
        let (_, party) = self
            .modify(id, "third party added", |c, now| c.add_third_party(details, actor, now))
            .await?;
        Ok(party)
    }

    pub async fn remove_third_party(
        &self,
        id: ClaimId,
        third_party_id: ThirdPartyId,
        actor: Actor<'_>,
    ) -> Result<ThirdParty, ClaimError> {
        let (_, party) = self
            .modify(id, "third party removed", |c, now| c.remove_third_party(third_party_id, actor, now))
            .await?;
        Ok(party)
    }

    pub async fn update_third_party(
        &self,
        id: ClaimId,
        third_party_id: ThirdPartyId,
        details: ThirdPartyDetails,
        actor: Actor<'_>,
    ) -> Result<ThirdParty, ClaimError> {
        let (_, party) = self
            .modify(id, "third party updated", |c, now| {
                c.update_third_party(third_party_id, details, actor, now)
            })
            .await?;
        Ok(party)
    }

    pub async fn upload_document(
        &self,
        id: ClaimId,
        upload: NewDocument,
        actor: Actor<'_>,
    ) -> Result<ClaimDocument, ClaimError> {
        let (_, document) = self
            .modify(id, "document uploaded", |c, now| c.upload_document(upload, actor, now))
            .await?;
        Ok(document)
    }

    pub async fn delete_document(
        &self,
        id: ClaimId,
        document_id: ClaimDocumentId,
        actor: Actor<'_>,
    ) -> Result<ClaimDocument, ClaimError> {
        let (_, document) = self
            .modify(id, "document deleted", |c, now| c.delete_document(document_id, actor, now))
            .await?;
        Ok(document)
    }

    pub async fn update_notes(&self, id: ClaimId, notes: &str, actor: Actor<'_>) -> Result<Claim, ClaimError> {
        let (claim, _) = self
            .modify(id, "notes updated", |c, now| {
                c.update_notes(notes, actor, now);
                Ok(())
            })
            .await?;
        Ok(claim)
    }

    pub async fn get_by_id(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        self.claims.get(id).await.map_err(|e| {
            if e.is_not_found() {
                ClaimError::ClaimNotFound(id.to_string())
            } else {
                e.into()
            }
        })
    }

    /// Looks a claim up by its `SIN-...` number
    pub async fn get_by_number(&self, number: &str) -> Result<Claim, ClaimError> {
        let parsed: DocumentNumber = number
            .parse()
            .map_err(|e: core_kernel::NumberingError| ClaimError::validation(e.to_string()))?;
        self.claims
            .find_first(&|c: &Claim| c.claim_number() == parsed)
            .await?
            .ok_or_else(|| ClaimError::ClaimNotFound(number.to_string()))
    }

    /// Every claim, newest report first
    pub async fn list_all(&self) -> Result<Vec<Claim>, ClaimError> {
        Ok(newest_first(self.claims.list_all().await?))
    }

    pub async fn list_by_policy(&self, policy_id: PolicyId) -> Result<Vec<Claim>, ClaimError> {
        let claims = self
            .claims
            .list_where(&|c: &Claim| c.policy_id() == policy_id)
            .await?;
        Ok(newest_first(claims))
    }

    pub async fn list_by_client(&self, client_id: ClientId) -> Result<Vec<Claim>, ClaimError> {
        let claims = self
            .claims
            .list_where(&|c: &Claim| c.client_id() == client_id)
            .await?;
        Ok(newest_first(claims))
    }

    pub async fn list_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, ClaimError> {
        let claims = self.claims.list_where(&|c: &Claim| c.status() == status).await?;
        Ok(newest_first(claims))
    }

    /// Audit trail in the order it was written
    pub async fn get_history(&self, id: ClaimId) -> Result<Vec<ClaimHistory>, ClaimError> {
        Ok(self.get_by_id(id).await?.history().to_vec())
    }

    pub async fn list_documents(&self, id: ClaimId) -> Result<Vec<ClaimDocument>, ClaimError> {
        Ok(self.get_by_id(id).await?.documents().to_vec())
    }
}
