//! Policy Aggregate Root
//!
//! The Policy aggregate is the consistency boundary for a motor policy: its
//! coverages, premium and endorsement trail change together in one write.
//!
//! # Invariants
//!
//! - A policy is created only from an accepted quote
//! - Endorsements are append-only
//! - `total_premium` changes only through an endorsement, and every
//!   endorsement records the total it produced
//! - State transitions must follow the allowed lifecycle

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{
    ClientId, CoverageId, Currency, DateRange, DistributorId, DocumentNumber, EndorsementId, Money,
    PolicyId, ProductId, QuoteId, Record,
};
use domain_rating::{DistributorType, PremiumBreakdown};

use crate::coverage::PolicyCoverage;
use crate::endorsement::{Endorsement, EndorsementType};
use crate::error::PolicyError;
use crate::events::PolicyEvent;
use crate::quote::{Quote, QuoteStatus, VehicleDetails};

/// Policy lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyStatus {
    /// Issued from a quote, awaiting payment
    Draft,
    Active,
    Suspended,
    Cancelled,
    /// Derived only, see [`Policy::effective_status`]
    Expired,
}

impl PolicyStatus {
    pub fn can_transition_to(&self, target: &PolicyStatus) -> bool {
        matches!(
            (self, target),
            (PolicyStatus::Draft, PolicyStatus::Active)
                | (PolicyStatus::Active, PolicyStatus::Suspended)
                | (
                    PolicyStatus::Draft
                        | PolicyStatus::Active
                        | PolicyStatus::Suspended
                        | PolicyStatus::Expired,
                    PolicyStatus::Cancelled
                )
        )
    }
}

/// Premium movement produced by an endorsement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PremiumDelta {
    /// Added to `total_premium`
    pub total: Money,
    /// Added to `sections_premium`
    pub sections: Money,
}

impl PremiumDelta {
    pub fn none(currency: Currency) -> Self {
        let zero = Money::zero(currency);
        Self { total: zero, sections: zero }
    }
}

/// Coverage and vehicle effect of an endorsement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndorsementEffect {
    AddCoverages(Vec<PolicyCoverage>),
    RemoveCoverages(Vec<CoverageId>),
    ChangeVehicleValue(Money),
}

/// Descriptive fields of an endorsement being applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndorsementDetails {
    pub endorsement_number: DocumentNumber,
    pub description: String,
    pub effective_date: NaiveDate,
    pub reason: Option<String>,
}

/// The Policy aggregate root
///
/// # State Machine
///
/// - Draft -> Active (via activate, on payment)
/// - Active -> Suspended (via suspend)
/// - any but Cancelled -> Cancelled (via cancel)
///
/// `Expired` is derived from the coverage period and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Unique policy identifier
    id: PolicyId,
    /// Human-readable policy number
    policy_number: DocumentNumber,
    policy_date: DateTime<Utc>,
    /// Current lifecycle state
    status: PolicyStatus,
    quote_id: Option<QuoteId>,
    quote_number: Option<DocumentNumber>,
    client_id: ClientId,
    distributor_id: Option<DistributorId>,
    distributor_type: Option<DistributorType>,
    product_id: ProductId,
    coverage_period: DateRange,
    duration_months: u32,
    vehicle: VehicleDetails,
    /// Copied from the quote, then moved by endorsements
    premium: PremiumBreakdown,
    is_paid: bool,
    payment_date: Option<DateTime<Utc>>,
    payment_reference: Option<String>,
    coverages: Vec<PolicyCoverage>,
    endorsements: Vec<Endorsement>,
    notes: Option<String>,
    /// Domain events to be published
    #[serde(skip)]
    events: Vec<PolicyEvent>,
    /// Version for optimistic concurrency
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Policy {
    /// Issues a draft policy from an accepted quote
    ///
    /// Every quote field and the full premium breakdown are copied; each
    /// rated coverage becomes an active policy coverage.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidStateTransition` unless the quote is accepted
    pub fn from_quote(
        id: PolicyId,
        policy_number: DocumentNumber,
        quote: &Quote,
        now: DateTime<Utc>,
    ) -> Result<Self, PolicyError> {
        if quote.status() != QuoteStatus::Accepted {
            return Err(PolicyError::invalid_transition(quote.status(), "Converted"));
        }

        let premium = quote.premium().clone();
        let coverages = premium.coverages.iter().map(PolicyCoverage::from_rated).collect();

        Ok(Self {
            id,
            policy_number,
            policy_date: now,
            status: PolicyStatus::Draft,
            quote_id: Some(quote.id()),
            quote_number: Some(quote.quote_number()),
            client_id: quote.client_id(),
            distributor_id: quote.distributor_id(),
            distributor_type: quote.distributor_type(),
            product_id: quote.product_id(),
            coverage_period: quote.coverage_period(),
            duration_months: quote.duration_months(),
            vehicle: quote.vehicle().clone(),
            premium,
            is_paid: false,
            payment_date: None,
            payment_reference: None,
            coverages,
            endorsements: Vec::new(),
            notes: quote.notes().map(str::to_string),
            events: vec![PolicyEvent::PolicyIssued {
                policy_id: id,
                policy_number,
                quote_id: Some(quote.id()),
                timestamp: now,
            }],
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns the policy ID
    pub fn id(&self) -> PolicyId {
        self.id
    }

    pub fn policy_number(&self) -> DocumentNumber {
        self.policy_number
    }

    pub fn policy_date(&self) -> DateTime<Utc> {
        self.policy_date
    }

    /// Stored status; see `effective_status` for the date-aware view
    pub fn status(&self) -> PolicyStatus {
        self.status
    }

    pub fn quote_id(&self) -> Option<QuoteId> {
        self.quote_id
    }

    pub fn quote_number(&self) -> Option<DocumentNumber> {
        self.quote_number
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn distributor_id(&self) -> Option<DistributorId> {
        self.distributor_id
    }

    pub fn distributor_type(&self) -> Option<DistributorType> {
        self.distributor_type
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn coverage_period(&self) -> DateRange {
        self.coverage_period
    }

    pub fn duration_months(&self) -> u32 {
        self.duration_months
    }

    pub fn vehicle(&self) -> &VehicleDetails {
        &self.vehicle
    }

    pub fn premium(&self) -> &PremiumBreakdown {
        &self.premium
    }

    pub fn total_premium(&self) -> Money {
        self.premium.total_premium
    }

    pub fn is_paid(&self) -> bool {
        self.is_paid
    }

    pub fn payment_date(&self) -> Option<DateTime<Utc>> {
        self.payment_date
    }

    pub fn payment_reference(&self) -> Option<&str> {
        self.payment_reference.as_deref()
    }

    /// All coverages, including deactivated ones
    pub fn coverages(&self) -> &[PolicyCoverage] {
        &self.coverages
    }

    pub fn active_coverages(&self) -> impl Iterator<Item = &PolicyCoverage> {
        self.coverages.iter().filter(|c| c.is_active)
    }

    /// Endorsements in the order they were applied
    pub fn endorsements(&self) -> &[Endorsement] {
        &self.endorsements
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<PolicyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Status with the coverage end date applied
    pub fn effective_status(&self, today: NaiveDate) -> PolicyStatus {
        match self.status {
            PolicyStatus::Cancelled => PolicyStatus::Cancelled,
            _ if self.coverage_period.has_ended_by(today) => PolicyStatus::Expired,
            status => status,
        }
    }

    /// Checks if the policy is in force on `date`
    pub fn is_in_force_on(&self, date: NaiveDate) -> bool {
        self.status == PolicyStatus::Active && self.coverage_period.contains(date)
    }

    fn transition(&mut self, target: PolicyStatus) -> Result<(), PolicyError> {
        if !self.status.can_transition_to(&target) {
            return Err(PolicyError::invalid_transition(self.status, &format!("{:?}", target)));
        }
        self.status = target;
        Ok(())
    }

    /// Activates the policy on receipt of payment
    ///
    /// # Errors
    ///
    /// Returns error if the policy is not a draft
    pub fn activate(&mut self, payment_reference: &str, now: DateTime<Utc>) -> Result<(), PolicyError> {
        if payment_reference.trim().is_empty() {
            return Err(PolicyError::validation("payment reference is required"));
        }
        self.transition(PolicyStatus::Active)?;

        self.is_paid = true;
        self.payment_date = Some(now);
        self.payment_reference = Some(payment_reference.to_string());
        self.updated_at = now;

        self.events.push(PolicyEvent::PolicyActivated {
            policy_id: self.id,
            payment_reference: payment_reference.to_string(),
            timestamp: now,
        });
        Ok(())
    }

    /// Suspends an active policy and records a Suspension endorsement
    ///
    /// # Errors
    ///
    /// Returns error if the policy is not active
    pub fn suspend(
        &mut self,
        reason: &str,
        endorsement_number: DocumentNumber,
        now: DateTime<Utc>,
    ) -> Result<Endorsement, PolicyError> {
        self.transition(PolicyStatus::Suspended)?;

        let endorsement = self.record_endorsement(
            EndorsementType::Suspension,
            EndorsementDetails {
                endorsement_number,
                description: "Suspension de la police".to_string(),
                effective_date: now.date_naive(),
                reason: Some(reason.to_string()),
            },
            Money::zero(self.premium.currency),
            self.premium.total_premium,
            now,
        );

        self.events.push(PolicyEvent::PolicySuspended {
            policy_id: self.id,
            reason: reason.to_string(),
            timestamp: now,
        });
        Ok(endorsement)
    }

    /// Cancels the policy and records a Cancellation endorsement
    ///
    /// The endorsement carries a new total of zero; the policy's own premium
    /// breakdown is left as issued.
    ///
    /// # Errors
    ///
    /// Returns error if the policy is already cancelled
    pub fn cancel(
        &mut self,
        reason: &str,
        endorsement_number: DocumentNumber,
        now: DateTime<Utc>,
    ) -> Result<Endorsement, PolicyError> {
        self.transition(PolicyStatus::Cancelled)?;

        let zero = Money::zero(self.premium.currency);
        let endorsement = self.record_endorsement(
            EndorsementType::Cancellation,
            EndorsementDetails {
                endorsement_number,
                description: "Annulation de la police".to_string(),
                effective_date: now.date_naive(),
                reason: Some(reason.to_string()),
            },
            zero,
            zero,
            now,
        );

        self.events.push(PolicyEvent::PolicyCancelled {
            policy_id: self.id,
            reason: reason.to_string(),
            timestamp: now,
        });
        Ok(endorsement)
    }

    /// Applies a priced coverage or vehicle-value change
    ///
    /// The effect is applied first, then `total_premium` and
    /// `sections_premium` move by `delta` and the endorsement is appended.
    ///
    /// # Errors
    ///
    /// * `PolicyError::InvalidStateTransition` on a cancelled policy
    /// * `PolicyError::NotFound` when removing a coverage that is not active
    /// * `PolicyError::Validation` when adding a coverage that is already active
    pub fn apply_endorsement(
        &mut self,
        effect: EndorsementEffect,
        delta: PremiumDelta,
        details: EndorsementDetails,
        now: DateTime<Utc>,
    ) -> Result<Endorsement, PolicyError> {
        if self.status == PolicyStatus::Cancelled {
            return Err(PolicyError::invalid_transition(self.status, "Endorsed"));
        }

        let endorsement_type = match effect {
            EndorsementEffect::AddCoverages(added) => {
                if let Some(duplicate) = added.iter().find(|a| self.has_active_coverage(a.coverage_id)) {
                    return Err(PolicyError::validation(format!(
                        "coverage {} is already active on this policy",
                        duplicate.code
                    )));
                }
                self.coverages.extend(added);
                EndorsementType::AddCoverage
            }
            EndorsementEffect::RemoveCoverages(removed) => {
                if let Some(missing) = removed.iter().find(|id| !self.has_active_coverage(**id)) {
                    return Err(PolicyError::not_found("PolicyCoverage", missing));
                }
                for coverage in self.coverages.iter_mut() {
                    if removed.contains(&coverage.coverage_id) {
                        coverage.deactivate();
                    }
                }
                EndorsementType::RemoveCoverage
            }
            EndorsementEffect::ChangeVehicleValue(new_value) => {
                self.vehicle.vehicle_value = new_value;
                EndorsementType::ChangeVehicleValue
            }
        };

        self.premium.sections_premium = self.premium.sections_premium.checked_add(&delta.sections)?;
        self.premium.total_premium = self.premium.total_premium.checked_add(&delta.total)?;
        let new_total = self.premium.total_premium;

        let endorsement = self.record_endorsement(endorsement_type, details, delta.total, new_total, now);
        Ok(endorsement)
    }

    /// Returns true if the coverage is currently active on the policy
    pub fn has_active_coverage(&self, coverage_id: CoverageId) -> bool {
        self.active_coverages().any(|c| c.coverage_id == coverage_id)
    }

    fn record_endorsement(
        &mut self,
        endorsement_type: EndorsementType,
        details: EndorsementDetails,
        premium_adjustment: Money,
        new_total_premium: Money,
        now: DateTime<Utc>,
    ) -> Endorsement {
        let endorsement = Endorsement {
            id: EndorsementId::new_v7(),
            policy_id: self.id,
            endorsement_number: details.endorsement_number,
            endorsement_type,
            description: details.description,
            premium_adjustment,
            new_total_premium,
            effective_date: details.effective_date,
            endorsement_date: now,
            reason: details.reason,
        };

        self.endorsements.push(endorsement.clone());
        self.updated_at = now;
        self.events.push(PolicyEvent::EndorsementApplied {
            policy_id: self.id,
            endorsement_id: endorsement.id,
            endorsement_number: endorsement.endorsement_number,
            endorsement_type,
            premium_adjustment,
            timestamp: now,
        });
        endorsement
    }
}

impl Record for Policy {
    type Id = PolicyId;
    const ENTITY: &'static str = "Policy";

    fn record_id(&self) -> PolicyId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::{DocumentKind, NumberingPeriod, VehicleCategoryId, VehicleMakeId, VehicleModelId};
    use domain_rating::{FuelType, MotorCoverage, RatingEngine};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::quote::QuoteRequest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
    }

    fn number(kind: DocumentKind, sequence: u32) -> DocumentNumber {
        DocumentNumber::new(kind, NumberingPeriod::new(2025, 3).unwrap(), sequence)
    }

    fn xof(amount: Decimal) -> Money {
        Money::new(amount, Currency::XOF)
    }

    fn generated_quote(catalogue: &[MotorCoverage]) -> Quote {
        let request = QuoteRequest {
            client_id: ClientId::new(),
            distributor_id: None,
            product_id: ProductId::new(),
            policy_start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            policy_end_date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            duration_months: 12,
            vehicle: VehicleDetails {
                category_id: VehicleCategoryId::new(),
                make_id: VehicleMakeId::new(),
                model_id: VehicleModelId::new(),
                registration_number: "1234 AB 01".to_string(),
                chassis_number: "WVWZZZ1JZXW000001".to_string(),
                year_of_manufacture: 2020,
                horsepower: 9,
                fuel_type: FuelType::Essence,
                vehicle_value: xof(dec!(5000000)),
            },
            coverage_ids: catalogue.iter().map(|c| c.id).collect(),
            professional_discount: Decimal::ZERO,
            commercial_discount: Decimal::ZERO,
            notes: Some("Client fidèle".to_string()),
        };
        let premium = RatingEngine::with_defaults()
            .calculate(&request.rating_request(catalogue.to_vec(), None))
            .unwrap();
        Quote::generate(number(DocumentKind::Quote, 1), request, None, premium, now(), 30).unwrap()
    }

    fn accepted_quote(catalogue: &[MotorCoverage]) -> Quote {
        let mut quote = generated_quote(catalogue);
        quote.accept(now()).unwrap();
        quote
    }

    fn draft_policy() -> Policy {
        let catalogue: Vec<MotorCoverage> = MotorCoverage::standard_catalogue()
            .into_iter()
            .filter(|c| c.code == "SECTION_A" || c.code == "SECTION_B")
            .collect();
        let quote = accepted_quote(&catalogue);
        Policy::from_quote(PolicyId::new_v7(), number(DocumentKind::Policy, 1), &quote, now()).unwrap()
    }

    fn details(sequence: u32) -> EndorsementDetails {
        EndorsementDetails {
            endorsement_number: number(DocumentKind::Endorsement, sequence),
            description: "Avenant".to_string(),
            effective_date: now().date_naive(),
            reason: None,
        }
    }

    #[test]
    fn test_from_quote_copies_breakdown_and_coverages() {
        let mut policy = draft_policy();

        assert_eq!(policy.status(), PolicyStatus::Draft);
        assert!(!policy.is_paid());
        assert_eq!(policy.coverages().len(), 2);
        assert!(policy.coverages().iter().all(|c| c.is_active));
        assert_eq!(policy.premium().sections_premium, xof(dec!(5000)));
        assert_eq!(policy.notes(), Some("Client fidèle"));
        assert_eq!(policy.take_events()[0].event_type(), "PolicyIssued");
    }

    #[test]
    fn test_from_unaccepted_quote_fails() {
        let quote = generated_quote(&[]);
        let result = Policy::from_quote(PolicyId::new(), number(DocumentKind::Policy, 1), &quote, now());
        assert!(matches!(result, Err(PolicyError::InvalidStateTransition { .. })));
    }

    #[test]
    fn test_activate_only_from_draft() {
        let mut policy = draft_policy();
        policy.activate("PAY-001", now()).unwrap();
        assert_eq!(policy.status(), PolicyStatus::Active);
        assert!(policy.is_paid());
        assert_eq!(policy.payment_reference(), Some("PAY-001"));
        assert_eq!(policy.payment_date(), Some(now()));

        assert!(policy.activate("PAY-002", now()).is_err());
    }

    #[test]
    fn test_suspend_records_zero_adjustment() {
        let mut policy = draft_policy();
        assert!(policy.suspend("Impayé", number(DocumentKind::Endorsement, 1), now()).is_err());

        policy.activate("PAY-001", now()).unwrap();
        let endorsement = policy
            .suspend("Impayé", number(DocumentKind::Endorsement, 1), now())
            .unwrap();

        assert_eq!(policy.status(), PolicyStatus::Suspended);
        assert_eq!(endorsement.endorsement_type, EndorsementType::Suspension);
        assert!(endorsement.premium_adjustment.is_zero());
        assert_eq!(endorsement.new_total_premium, policy.total_premium());
        assert_eq!(endorsement.reason.as_deref(), Some("Impayé"));
    }

    #[test]
    fn test_cancel_from_any_state_but_cancelled() {
        let mut policy = draft_policy();
        let endorsement = policy
            .cancel("Vente du véhicule", number(DocumentKind::Endorsement, 1), now())
            .unwrap();

        assert_eq!(policy.status(), PolicyStatus::Cancelled);
        assert!(endorsement.new_total_premium.is_zero());
        assert!(matches!(
            policy.cancel("again", number(DocumentKind::Endorsement, 2), now()),
            Err(PolicyError::InvalidStateTransition { .. })
        ));
        assert_eq!(policy.endorsements().len(), 1);
    }

    #[test]
    fn test_add_and_remove_coverage() {
        let mut policy = draft_policy();
        let glass = MotorCoverage::new("SECTION_E", "Bris de Glace", 'E', dec!(5000));
        let before = policy.total_premium();

        let endorsement = policy
            .apply_endorsement(
                EndorsementEffect::AddCoverages(vec![PolicyCoverage::from_catalogue(&glass, Currency::XOF)]),
                PremiumDelta { total: xof(dec!(5000)), sections: xof(dec!(5000)) },
                details(1),
                now(),
            )
            .unwrap();

        assert_eq!(endorsement.new_total_premium, before + xof(dec!(5000)));
        assert_eq!(policy.premium().sections_premium, xof(dec!(10000)));
        assert_eq!(policy.active_coverages().count(), 3);

        policy
            .apply_endorsement(
                EndorsementEffect::RemoveCoverages(vec![glass.id]),
                PremiumDelta { total: xof(dec!(-5000)), sections: xof(dec!(-5000)) },
                details(2),
                now(),
            )
            .unwrap();

        assert_eq!(policy.total_premium(), before);
        assert_eq!(policy.active_coverages().count(), 2);
        assert_eq!(policy.coverages().len(), 3);
        assert_eq!(policy.endorsements().len(), 2);
    }

    #[test]
    fn test_remove_unknown_coverage_is_not_found() {
        let mut policy = draft_policy();
        let result = policy.apply_endorsement(
            EndorsementEffect::RemoveCoverages(vec![CoverageId::new()]),
            PremiumDelta::none(Currency::XOF),
            details(1),
            now(),
        );
        assert!(matches!(result, Err(PolicyError::NotFound { .. })));
        assert!(policy.endorsements().is_empty());
    }

    #[test]
    fn test_no_endorsement_on_cancelled_policy() {
        let mut policy = draft_policy();
        policy.cancel("Fraude", number(DocumentKind::Endorsement, 1), now()).unwrap();
        let result = policy.apply_endorsement(
            EndorsementEffect::ChangeVehicleValue(xof(dec!(6000000))),
            PremiumDelta::none(Currency::XOF),
            details(2),
            now(),
        );
        assert!(matches!(result, Err(PolicyError::InvalidStateTransition { .. })));
    }

    #[test]
    fn test_effective_status_expires_after_end_date() {
        let mut policy = draft_policy();
        policy.activate("PAY-001", now()).unwrap();
        let end = policy.coverage_period().end;

        assert_eq!(policy.effective_status(end), PolicyStatus::Active);
        assert_eq!(policy.effective_status(end.succ_opt().unwrap()), PolicyStatus::Expired);
        assert!(policy.is_in_force_on(end));
        assert!(!policy.is_in_force_on(end.succ_opt().unwrap()));
    }
}
