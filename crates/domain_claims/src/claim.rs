//! Claim aggregate
//!
//! A claim is a shared record (numbers, dates, amounts, adjudication fields,
//! documents, history) plus a closed [`ClaimKind`] carrying the
//! product-specific part. All status changes go through
//! [`ClaimAction::target`], so the transition table lives in one place.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{
    ClaimDocumentId, ClaimId, ClientId, DateRange, DocumentNumber, Money, PolicyId, Record,
    ThirdPartyId,
};

use crate::documents::{ClaimDocument, NewDocument};
use crate::error::ClaimError;
use crate::history::{ClaimHistory, HistoryAction};
use crate::ports::InsuredPolicy;
use crate::third_party::{ThirdParty, ThirdPartyDetails};
use crate::workflow::{ClaimAction, ClaimStatus};

/// Type of motor loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotorClaimType {
    Accident,
    Theft,
    Fire,
    Vandalism,
    NaturalDisaster,
    GlassBreakage,
    Other,
}

/// Motor-specific incident details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorClaimDetails {
    pub claim_type: MotorClaimType,
    pub has_injuries: bool,
    pub injury_count: u32,
    /// A constat or police report exists
    pub has_police_report: bool,
    pub police_report_number: Option<String>,
    pub police_station: Option<String>,
}

impl MotorClaimDetails {
    pub fn new(claim_type: MotorClaimType) -> Self {
        Self {
            claim_type,
            has_injuries: false,
            injury_count: 0,
            has_police_report: false,
            police_report_number: None,
            police_station: None,
        }
    }
}

/// Product-specific part of a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimKind {
    Motor {
        details: MotorClaimDetails,
        third_parties: Vec<ThirdParty>,
    },
}

impl ClaimKind {
    pub fn product_type(&self) -> &'static str {
        match self {
            ClaimKind::Motor { .. } => "Motor",
        }
    }

    pub fn third_parties(&self) -> &[ThirdParty] {
        match self {
            ClaimKind::Motor { third_parties, .. } => third_parties,
        }
    }

    fn third_parties_mut(&mut self) -> &mut Vec<ThirdParty> {
        match self {
            ClaimKind::Motor { third_parties, .. } => third_parties,
        }
    }
}

/// Input to `ClaimService::create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub policy_id: PolicyId,
    pub claim_date: NaiveDate,
    pub location: String,
    pub description: String,
    pub circumstances: Option<String>,
    pub claimed_amount: Money,
    pub motor: MotorClaimDetails,
    pub third_parties: Vec<ThirdPartyDetails>,
}

/// Editable fields of a draft claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimUpdate {
    pub claim_date: NaiveDate,
    pub location: String,
    pub description: String,
    pub circumstances: Option<String>,
    pub claimed_amount: Money,
    pub motor: MotorClaimDetails,
}

/// Expert assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertAssignment {
    pub expert_name: String,
    pub expertise_date: NaiveDate,
    pub notes: Option<String>,
}

/// Expert's report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expertise {
    pub estimated_amount: Money,
    pub report: String,
    pub recommended_deductible: Option<Money>,
}

/// Approval decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub approved_amount: Money,
    pub deductible: Money,
    pub comments: Option<String>,
}

/// Settlement payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub payment_reference: String,
    pub payment_method: String,
    pub settlement_date: NaiveDate,
    pub comments: Option<String>,
}

fn ensure_not_negative(amount: &Money, field: &str) -> Result<(), ClaimError> {
    if amount.is_negative() {
        return Err(ClaimError::validation(format!("{} cannot be negative", field)));
    }
    Ok(())
}

fn ensure_covered(claim_date: NaiveDate, period: &DateRange) -> Result<(), ClaimError> {
    if !period.contains(claim_date) {
        return Err(ClaimError::OutOfCoveragePeriod(claim_date.to_string()));
    }
    Ok(())
}

/// A claim against a motor policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    id: ClaimId,
    /// `SIN-YYYY-MM-NNNN`
    claim_number: DocumentNumber,
    policy_id: PolicyId,
    policy_number: String,
    client_id: ClientId,
    /// Date of loss
    claim_date: NaiveDate,
    reported_date: DateTime<Utc>,
    location: String,
    description: String,
    circumstances: Option<String>,
    status: ClaimStatus,
    kind: ClaimKind,
    claimed_amount: Money,
    estimated_amount: Option<Money>,
    approved_amount: Option<Money>,
    deductible: Option<Money>,
    /// approved_amount - deductible
    net_payable_amount: Option<Money>,
    assigned_expert: Option<String>,
    expertise_date: Option<NaiveDate>,
    expertise_report: Option<String>,
    approval_date: Option<DateTime<Utc>>,
    approved_by: Option<String>,
    settlement_date: Option<NaiveDate>,
    payment_reference: Option<String>,
    payment_method: Option<String>,
    closed_date: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    internal_notes: Option<String>,
    documents: Vec<ClaimDocument>,
    history: Vec<ClaimHistory>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Claim {
    /// Opens a draft claim against an active policy
    ///
    /// # Errors
    ///
    /// * `ClaimError::PolicyNotActive` unless the policy is active
    /// * `ClaimError::OutOfCoveragePeriod` if the loss date is outside the policy period
    /// * `ClaimError::Validation` for a negative claimed amount or bad third-party data
    pub fn open(
        claim_number: DocumentNumber,
        request: ClaimRequest,
        policy: &InsuredPolicy,
        performed_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ClaimError> {
        if !policy.is_active {
            return Err(ClaimError::PolicyNotActive(policy.policy_number.clone()));
        }
        ensure_covered(request.claim_date, &policy.coverage_period)?;
        ensure_not_negative(&request.claimed_amount, "claimed amount")?;
        for party in &request.third_parties {
            party.validate()?;
        }

        let third_parties = request.third_parties.into_iter().map(ThirdParty::new).collect();
        let created = ClaimHistory::new(HistoryAction::ClaimCreated, "Claim created", now)
            .with_transition(None, ClaimStatus::Draft)
            .by(performed_by);

        Ok(Self {
            id: ClaimId::new_v7(),
            claim_number,
            policy_id: policy.policy_id,
            policy_number: policy.policy_number.clone(),
            client_id: policy.client_id,
            claim_date: request.claim_date,
            reported_date: now,
            location: request.location,
            description: request.description,
            circumstances: request.circumstances,
            status: ClaimStatus::Draft,
            kind: ClaimKind::Motor {
                details: request.motor,
                third_parties,
            },
            claimed_amount: request.claimed_amount,
            estimated_amount: None,
            approved_amount: None,
            deductible: None,
            net_payable_amount: None,
            assigned_expert: None,
            expertise_date: None,
            expertise_report: None,
            approval_date: None,
            approved_by: None,
            settlement_date: None,
            payment_reference: None,
            payment_method: None,
            closed_date: None,
            rejection_reason: None,
            internal_notes: None,
            documents: Vec::new(),
            history: vec![created],
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> ClaimId {
        self.id
    }

    pub fn claim_number(&self) -> DocumentNumber {
        self.claim_number
    }

    pub fn policy_id(&self) -> PolicyId {
        self.policy_id
    }

    pub fn policy_number(&self) -> &str {
        &self.policy_number
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn claim_date(&self) -> NaiveDate {
        self.claim_date
    }

    pub fn reported_date(&self) -> DateTime<Utc> {
        self.reported_date
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn circumstances(&self) -> Option<&str> {
        self.circumstances.as_deref()
    }

    pub fn status(&self) -> ClaimStatus {
        self.status
    }

    pub fn kind(&self) -> &ClaimKind {
        &self.kind
    }

    pub fn third_parties(&self) -> &[ThirdParty] {
        self.kind.third_parties()
    }

    pub fn claimed_amount(&self) -> Money {
        self.claimed_amount
    }

    pub fn estimated_amount(&self) -> Option<Money> {
        self.estimated_amount
    }

    pub fn approved_amount(&self) -> Option<Money> {
        self.approved_amount
    }

    pub fn deductible(&self) -> Option<Money> {
        self.deductible
    }

    pub fn net_payable_amount(&self) -> Option<Money> {
        self.net_payable_amount
    }

    pub fn assigned_expert(&self) -> Option<&str> {
        self.assigned_expert.as_deref()
    }

    pub fn expertise_date(&self) -> Option<NaiveDate> {
        self.expertise_date
    }

    pub fn expertise_report(&self) -> Option<&str> {
        self.expertise_report.as_deref()
    }

    pub fn approval_date(&self) -> Option<DateTime<Utc>> {
        self.approval_date
    }

    pub fn approved_by(&self) -> Option<&str> {
        self.approved_by.as_deref()
    }

    pub fn settlement_date(&self) -> Option<NaiveDate> {
        self.settlement_date
    }

    pub fn payment_reference(&self) -> Option<&str> {
        self.payment_reference.as_deref()
    }

    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    pub fn closed_date(&self) -> Option<DateTime<Utc>> {
        self.closed_date
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn internal_notes(&self) -> Option<&str> {
        self.internal_notes.as_deref()
    }

    pub fn documents(&self) -> &[ClaimDocument] {
        &self.documents
    }

    /// Audit trail in the order it was written
    pub fn history(&self) -> &[ClaimHistory] {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the claim according to the transition table, returning the old status
    fn transition(&mut self, action: ClaimAction) -> Result<ClaimStatus, ClaimError> {
        let target = action
            .target(self.status)
            .ok_or_else(|| ClaimError::invalid_transition(self.status, action.target_name()))?;
        let old = self.status;
        self.status = target;
        Ok(old)
    }

    fn record(&mut self, entry: ClaimHistory, now: DateTime<Utc>) {
        self.history.push(entry);
        self.updated_at = now;
    }

    fn record_transition(
        &mut self,
        old: ClaimStatus,
        action_type: HistoryAction,
        description: String,
        performed_by: Option<&str>,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) {
        let entry = ClaimHistory::new(action_type, description, now)
            .with_transition(Some(old), self.status)
            .by(performed_by)
            .with_comment(comment);
        self.record(entry, now);
    }

    /// Draft -> Submitted
    pub fn submit(&mut self, performed_by: Option<&str>, now: DateTime<Utc>) -> Result<(), ClaimError> {
        let old = self.transition(ClaimAction::Submit)?;
        self.record_transition(
            old,
            HistoryAction::ClaimSubmitted,
            "Claim submitted for review".to_string(),
            performed_by,
            None,
            now,
        );
        Ok(())
    }

    /// Submitted -> UnderReview
    pub fn start_review(&mut self, performed_by: Option<&str>, now: DateTime<Utc>) -> Result<(), ClaimError> {
        let old = self.transition(ClaimAction::StartReview)?;
        self.record_transition(
            old,
            HistoryAction::ReviewStarted,
            "Claim review started".to_string(),
            performed_by,
            None,
            now,
        );
        Ok(())
    }

    /// UnderReview/Investigating -> Investigating, (re)assigning the expert
    pub fn assign_expert(
        &mut self,
        assignment: ExpertAssignment,
        performed_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), ClaimError> {
        if assignment.expert_name.trim().is_empty() {
            return Err(ClaimError::validation("expert name is required"));
        }
        let old = self.transition(ClaimAction::AssignExpert)?;
        let description = format!("Expert assigned: {}", assignment.expert_name);
        self.assigned_expert = Some(assignment.expert_name);
        self.expertise_date = Some(assignment.expertise_date);
        self.record_transition(
            old,
            HistoryAction::ExpertAssigned,
            description,
            performed_by,
            assignment.notes,
            now,
        );
        Ok(())
    }

    /// Records the expert's estimate; the status stays Investigating
    ///
    /// # Errors
    ///
    /// * `ClaimError::InvalidStatusTransition` unless Investigating
    /// * `ClaimError::NoExpertAssigned` if no expert is assigned
    pub fn submit_expertise(
        &mut self,
        expertise: Expertise,
        performed_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), ClaimError> {
        ensure_not_negative(&expertise.estimated_amount, "estimated amount")?;
        if let Some(deductible) = &expertise.recommended_deductible {
            ensure_not_negative(deductible, "deductible")?;
        }
        if ClaimAction::SubmitExpertise.target(self.status).is_none() {
            return Err(ClaimError::invalid_transition(self.status, "Investigating"));
        }
        if self.assigned_expert.is_none() {
            return Err(ClaimError::NoExpertAssigned);
        }

        let description = format!("Expertise report submitted, estimate {}", expertise.estimated_amount);
        self.estimated_amount = Some(expertise.estimated_amount);
        self.expertise_report = Some(expertise.report);
        if let Some(deductible) = expertise.recommended_deductible {
            self.deductible = Some(deductible);
        }
        let entry = ClaimHistory::new(HistoryAction::ExpertiseSubmitted, description, now).by(performed_by);
        self.record(entry, now);
        Ok(())
    }

    /// UnderReview/Investigating -> Approved
    ///
    /// Sets `net_payable_amount = approved_amount - deductible`.
    pub fn approve(
        &mut self,
        approval: Approval,
        performed_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), ClaimError> {
        ensure_not_negative(&approval.approved_amount, "approved amount")?;
        ensure_not_negative(&approval.deductible, "deductible")?;
        let net_payable = approval.approved_amount.checked_sub(&approval.deductible)?;

        let old = self.transition(ClaimAction::Approve)?;
        self.approved_amount = Some(approval.approved_amount);
        self.deductible = Some(approval.deductible);
        self.net_payable_amount = Some(net_payable);
        self.approval_date = Some(now);
        self.approved_by = performed_by.map(str::to_string);

        let description = format!(
            "Claim approved: amount {}, deductible {}, net payable {}",
            approval.approved_amount, approval.deductible, net_payable
        );
        self.record_transition(
            old,
            HistoryAction::ClaimApproved,
            description,
            performed_by,
            approval.comments,
            now,
        );
        Ok(())
    }

    /// Any open status -> Rejected
    pub fn reject(
        &mut self,
        reason: &str,
        comments: Option<String>,
        performed_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), ClaimError> {
        if reason.trim().is_empty() {
            return Err(ClaimError::validation("rejection reason is required"));
        }
        let old = self.transition(ClaimAction::Reject)?;
        self.rejection_reason = Some(reason.to_string());
        self.closed_date = Some(now);
        self.record_transition(
            old,
            HistoryAction::ClaimRejected,
            format!("Claim rejected: {}", reason),
            performed_by,
            comments,
            now,
        );
        Ok(())
    }

    /// Approved -> Settled
    ///
    /// # Errors
    ///
    /// * `ClaimError::InvalidStatusTransition` unless Approved
    /// * `ClaimError::NothingToSettle` if the net payable amount is not positive
    pub fn settle(
        &mut self,
        settlement: Settlement,
        performed_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), ClaimError> {
        if ClaimAction::Settle.target(self.status).is_none() {
            return Err(ClaimError::invalid_transition(self.status, "Settled"));
        }
        let net_payable = match self.net_payable_amount {
            Some(amount) if amount.is_positive() => amount,
            _ => return Err(ClaimError::NothingToSettle),
        };

        let old = self.transition(ClaimAction::Settle)?;
        let description = format!(
            "Claim settled: paid {}, reference {}",
            net_payable, settlement.payment_reference
        );
        self.settlement_date = Some(settlement.settlement_date);
        self.payment_reference = Some(settlement.payment_reference);
        self.payment_method = Some(settlement.payment_method);
        self.record_transition(
            old,
            HistoryAction::ClaimSettled,
            description,
            performed_by,
            settlement.comments,
            now,
        );
        Ok(())
    }

    /// Settled/Rejected -> Closed
    pub fn close(&mut self, performed_by: Option<&str>, now: DateTime<Utc>) -> Result<(), ClaimError> {
        let old = self.transition(ClaimAction::Close)?;
        self.closed_date = Some(now);
        self.record_transition(
            old,
            HistoryAction::ClaimClosed,
            "Claim closed".to_string(),
            performed_by,
            None,
            now,
        );
        Ok(())
    }

    /// Edits a draft claim
    ///
    /// The new loss date must still fall within `coverage_period`.
    pub fn update(
        &mut self,
        update: ClaimUpdate,
        coverage_period: &DateRange,
        performed_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), ClaimError> {
        if ClaimAction::Update.target(self.status).is_none() {
            return Err(ClaimError::invalid_transition(self.status, "Draft"));
        }
        ensure_covered(update.claim_date, coverage_period)?;
        ensure_not_negative(&update.claimed_amount, "claimed amount")?;

        self.claim_date = update.claim_date;
        self.location = update.location;
        self.description = update.description;
        self.circumstances = update.circumstances;
        self.claimed_amount = update.claimed_amount;
        match &mut self.kind {
            ClaimKind::Motor { details, .. } => *details = update.motor,
        }

        let entry = ClaimHistory::new(HistoryAction::ClaimUpdated, "Draft claim updated", now).by(performed_by);
        self.record(entry, now);
        Ok(())
    }

    pub fn add_third_party(
        &mut self,
        details: ThirdPartyDetails,
        performed_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ThirdParty, ClaimError> {
        details.validate()?;
        let party = ThirdParty::new(details);
        self.kind.third_parties_mut().push(party.clone());

        let description = format!("Third party added: {}", party.details.full_name);
        let entry = ClaimHistory::new(HistoryAction::ThirdPartyAdded, description, now).by(performed_by);
        self.record(entry, now);
        Ok(party)
    }

    pub fn remove_third_party(
        &mut self,
        id: ThirdPartyId,
        performed_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ThirdParty, ClaimError> {
        let parties = self.kind.third_parties_mut();
        let index = parties
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ClaimError::not_found("ThirdParty", id))?;
        let removed = parties.remove(index);

        let description = format!("Third party removed: {}", removed.details.full_name);
        let entry = ClaimHistory::new(HistoryAction::ThirdPartyRemoved, description, now).by(performed_by);
        self.record(entry, now);
        Ok(removed)
    }

    pub fn update_third_party(
        &mut self,
        id: ThirdPartyId,
        details: ThirdPartyDetails,
        performed_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ThirdParty, ClaimError> {
        details.validate()?;
        let party = self
            .kind
            .third_parties_mut()
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ClaimError::not_found("ThirdParty", id))?;
        party.details = details;
        let updated = party.clone();

        let description = format!("Third party updated: {}", updated.details.full_name);
        let entry = ClaimHistory::new(HistoryAction::ThirdPartyUpdated, description, now).by(performed_by);
        self.record(entry, now);
        Ok(updated)
    }

    pub fn upload_document(
        &mut self,
        upload: NewDocument,
        performed_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ClaimDocument, ClaimError> {
        upload.validate()?;
        let document = ClaimDocument::from_upload(upload, performed_by, now);
        self.documents.push(document.clone());

        let description = format!("Document uploaded: {} ({})", document.file_name, document.document_type);
        let entry = ClaimHistory::new(HistoryAction::DocumentUploaded, description, now).by(performed_by);
        self.record(entry, now);
        Ok(document)
    }

    pub fn delete_document(
        &mut self,
        id: ClaimDocumentId,
        performed_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ClaimDocument, ClaimError> {
        let index = self
            .documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| ClaimError::not_found("ClaimDocument", id))?;
        let removed = self.documents.remove(index);

        let description = format!("Document deleted: {}", removed.file_name);
        let entry = ClaimHistory::new(HistoryAction::DocumentDeleted, description, now).by(performed_by);
        self.record(entry, now);
        Ok(removed)
    }

    pub fn update_notes(&mut self, notes: &str, performed_by: Option<&str>, now: DateTime<Utc>) {
        self.internal_notes = Some(notes.to_string());
        let entry = ClaimHistory::new(HistoryAction::NotesUpdated, "Internal notes updated", now).by(performed_by);
        self.record(entry, now);
    }
}

impl Record for Claim {
    type Id = ClaimId;
    const ENTITY: &'static str = "Claim";

    fn record_id(&self) -> ClaimId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
