//! Motor quotes (devis)
//!
//! A quote is a priced, time-bounded offer. It is immutable once generated
//! apart from its status and, after acceptance, the id of the single policy
//! it was converted into.
//!
//! # Lifecycle
//!
//! ```text
//! Generated -> Accepted -> (converted)
//!           \-> Rejected
//! ```
//!
//! `Draft` exists for completeness but creation goes straight to `Generated`.
//! `Expired` is never stored; it is derived from the expiry date.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{
    ClientId, DateRange, DistributorId, DocumentNumber, Money, PolicyId, ProductId, QuoteId,
    Record, VehicleCategoryId, VehicleMakeId, VehicleModelId, CoverageId,
};
use domain_rating::{DistributorType, FuelType, MotorCoverage, PremiumBreakdown, RatingRequest};

use crate::error::PolicyError;
use crate::events::PolicyEvent;

/// Quote lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuoteStatus {
    Draft,
    Generated,
    Accepted,
    Rejected,
    /// Derived only, see [`Quote::effective_status`]
    Expired,
}

impl QuoteStatus {
    pub fn can_transition_to(&self, target: &QuoteStatus) -> bool {
        matches!(
            (self, target),
            (QuoteStatus::Draft, QuoteStatus::Generated)
                | (QuoteStatus::Generated, QuoteStatus::Accepted)
                | (QuoteStatus::Generated, QuoteStatus::Rejected)
        )
    }
}

/// The insured vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDetails {
    pub category_id: VehicleCategoryId,
    pub make_id: VehicleMakeId,
    pub model_id: VehicleModelId,
    pub registration_number: String,
    pub chassis_number: String,
    pub year_of_manufacture: i32,
    /// Fiscal horsepower (CV)
    pub horsepower: u32,
    pub fuel_type: FuelType,
    pub vehicle_value: Money,
}

/// Input to `QuoteService::create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub client_id: ClientId,
    pub distributor_id: Option<DistributorId>,
    pub product_id: ProductId,
    pub policy_start_date: NaiveDate,
    pub policy_end_date: NaiveDate,
    pub duration_months: u32,
    pub vehicle: VehicleDetails,
    pub coverage_ids: Vec<CoverageId>,
    /// Percent
    pub professional_discount: Decimal,
    /// Percent
    pub commercial_discount: Decimal,
    pub notes: Option<String>,
}

impl QuoteRequest {
    /// Checks the request before any reference lookup
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Validation` for a non-positive vehicle value or
    /// horsepower, a zero duration, negative discounts, discounts above 100% in
    /// total, or an end date before the start date.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !self.vehicle.vehicle_value.is_positive() {
            return Err(PolicyError::validation("vehicle value must be positive"));
        }
        if self.vehicle.horsepower == 0 {
            return Err(PolicyError::validation("horsepower must be positive"));
        }
        if self.duration_months == 0 {
            return Err(PolicyError::validation("duration must be at least one month"));
        }
        if self.professional_discount < Decimal::ZERO || self.commercial_discount < Decimal::ZERO {
            return Err(PolicyError::validation("discounts cannot be negative"));
        }
        if self.professional_discount + self.commercial_discount > dec!(100) {
            return Err(PolicyError::validation("combined discounts cannot exceed 100%"));
        }
        if self.policy_end_date < self.policy_start_date {
            return Err(PolicyError::validation("policy end date is before start date"));
        }
        Ok(())
    }

    /// Builds the rating engine input from this request
    pub fn rating_request(
        &self,
        coverages: Vec<MotorCoverage>,
        distributor_type: Option<DistributorType>,
    ) -> RatingRequest {
        let mut request = RatingRequest::new(
            self.vehicle.vehicle_value,
            self.vehicle.horsepower,
            self.vehicle.fuel_type,
            self.duration_months,
        )
        .with_coverages(coverages)
        .with_discounts(self.professional_discount, self.commercial_discount);
        if let Some(distributor_type) = distributor_type {
            request = request.with_distributor(distributor_type);
        }
        request
    }
}

/// A motor quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    id: QuoteId,
    quote_number: DocumentNumber,
    quote_date: DateTime<Utc>,
    expiry_date: DateTime<Utc>,
    status: QuoteStatus,
    client_id: ClientId,
    distributor_id: Option<DistributorId>,
    distributor_type: Option<DistributorType>,
    product_id: ProductId,
    coverage_period: DateRange,
    duration_months: u32,
    vehicle: VehicleDetails,
    premium: PremiumBreakdown,
    notes: Option<String>,
    /// Set once, when a policy claims this quote
    converted_policy_id: Option<PolicyId>,
    #[serde(skip)]
    events: Vec<PolicyEvent>,
    version: u64,
}

impl Quote {
    /// Creates a generated quote from a validated request and its rating
    pub fn generate(
        quote_number: DocumentNumber,
        request: QuoteRequest,
        distributor_type: Option<DistributorType>,
        premium: PremiumBreakdown,
        now: DateTime<Utc>,
        validity_days: i64,
    ) -> Result<Self, PolicyError> {
        let coverage_period = DateRange::new(request.policy_start_date, request.policy_end_date)
            .map_err(|e| PolicyError::validation(e.to_string()))?;
        let id = QuoteId::new_v7();
        let expiry_date = now + Duration::days(validity_days);

        let events = vec![PolicyEvent::QuoteGenerated {
            quote_id: id,
            quote_number,
            total_premium: premium.total_premium,
            expiry_date,
            timestamp: now,
        }];

        Ok(Self {
            id,
            quote_number,
            quote_date: now,
            expiry_date,
            status: QuoteStatus::Generated,
            client_id: request.client_id,
            distributor_id: request.distributor_id,
            distributor_type,
            product_id: request.product_id,
            coverage_period,
            duration_months: request.duration_months,
            vehicle: request.vehicle,
            premium,
            notes: request.notes,
            converted_policy_id: None,
            events,
            version: 0,
        })
    }

    pub fn id(&self) -> QuoteId {
        self.id
    }

    pub fn quote_number(&self) -> DocumentNumber {
        self.quote_number
    }

    pub fn quote_date(&self) -> DateTime<Utc> {
        self.quote_date
    }

    pub fn expiry_date(&self) -> DateTime<Utc> {
        self.expiry_date
    }

    /// Stored status; see `effective_status` for the expiry-aware view
    pub fn status(&self) -> QuoteStatus {
        self.status
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

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn converted_policy_id(&self) -> Option<PolicyId> {
        self.converted_policy_id
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<PolicyEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_date
    }

    /// Status with expiry applied to open quotes
    pub fn effective_status(&self, now: DateTime<Utc>) -> QuoteStatus {
        match self.status {
            QuoteStatus::Draft | QuoteStatus::Generated if self.is_expired(now) => QuoteStatus::Expired,
            status => status,
        }
    }

    /// Accepts the offer
    ///
    /// # Errors
    ///
    /// * `PolicyError::InvalidStateTransition` unless the quote is `Generated`
    /// * `PolicyError::QuoteExpired` once the validity period is over
    pub fn accept(&mut self, now: DateTime<Utc>) -> Result<(), PolicyError> {
        if !self.status.can_transition_to(&QuoteStatus::Accepted) {
            return Err(PolicyError::invalid_transition(self.status, "Accepted"));
        }
        if self.is_expired(now) {
            return Err(PolicyError::QuoteExpired);
        }
        self.status = QuoteStatus::Accepted;
        self.events.push(PolicyEvent::QuoteAccepted {
            quote_id: self.id,
            timestamp: now,
        });
        Ok(())
    }

    /// Rejects the offer
    ///
    /// # Errors
    ///
    /// `PolicyError::InvalidStateTransition` unless the quote is `Generated`
    pub fn reject(&mut self, now: DateTime<Utc>) -> Result<(), PolicyError> {
        if !self.status.can_transition_to(&QuoteStatus::Rejected) {
            return Err(PolicyError::invalid_transition(self.status, "Rejected"));
        }
        self.status = QuoteStatus::Rejected;
        self.events.push(PolicyEvent::QuoteRejected {
            quote_id: self.id,
            timestamp: now,
        });
        Ok(())
    }

    /// Records the policy this quote is converted into
    ///
    /// # Errors
    ///
    /// * `PolicyError::InvalidStateTransition` unless the quote is `Accepted`
    /// * `PolicyError::AlreadyConverted` if a policy already claimed it
    pub fn mark_converted(&mut self, policy_id: PolicyId, now: DateTime<Utc>) -> Result<(), PolicyError> {
        if self.status != QuoteStatus::Accepted {
            return Err(PolicyError::invalid_transition(self.status, "Converted"));
        }
        if self.converted_policy_id.is_some() {
            return Err(PolicyError::AlreadyConverted { quote_id: self.id });
        }
        self.converted_policy_id = Some(policy_id);
        self.events.push(PolicyEvent::QuoteConverted {
            quote_id: self.id,
            policy_id,
            timestamp: now,
        });
        Ok(())
    }

    /// Drops the claim `mark_converted` made for `policy_id`
    ///
    /// Returns false if the quote is claimed by another policy or not at all.
    pub fn release_conversion(&mut self, policy_id: PolicyId) -> bool {
        if self.converted_policy_id != Some(policy_id) {
            return false;
        }
        self.converted_policy_id = None;
        true
    }
}

impl Record for Quote {
    type Id = QuoteId;
    const ENTITY: &'static str = "Quote";

    fn record_id(&self) -> QuoteId {
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
    use core_kernel::{Currency, DocumentKind, NumberingPeriod};
    use domain_rating::RatingEngine;

    fn request() -> QuoteRequest {
        QuoteRequest {
            client_id: ClientId::new(),
            distributor_id: None,
            product_id: ProductId::new(),
            policy_start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            policy_end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            duration_months: 12,
            vehicle: VehicleDetails {
                category_id: VehicleCategoryId::new(),
                make_id: VehicleMakeId::new(),
                model_id: VehicleModelId::new(),
                registration_number: "AB-1234-CI".to_string(),
                chassis_number: "VF1RFB00X12345678".to_string(),
                year_of_manufacture: 2021,
                horsepower: 9,
                fuel_type: FuelType::Essence,
                vehicle_value: Money::new(dec!(5000000), Currency::XOF),
            },
            coverage_ids: vec![],
            professional_discount: Decimal::ZERO,
            commercial_discount: Decimal::ZERO,
            notes: None,
        }
    }

    fn generated(now: DateTime<Utc>) -> Quote {
        let request = request();
        let premium = RatingEngine::with_defaults()
            .calculate(&request.rating_request(vec![], None))
            .unwrap();
        let number = DocumentNumber::new(DocumentKind::Quote, NumberingPeriod::new(2025, 1).unwrap(), 1);
        Quote::generate(number, request, None, premium, now, 30).unwrap()
    }

    fn jan(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_generate_sets_expiry_and_event() {
        let mut quote = generated(jan(1));
        assert_eq!(quote.status(), QuoteStatus::Generated);
        assert_eq!(quote.expiry_date(), jan(31));
        assert_eq!(quote.premium().total_premium.amount(), dec!(174750));

        let events = quote.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "QuoteGenerated");
        assert!(quote.take_events().is_empty());
    }

    #[test]
    fn test_accept_then_reject_fails() {
        let mut quote = generated(jan(1));
        quote.accept(jan(2)).unwrap();
        assert_eq!(quote.status(), QuoteStatus::Accepted);
        assert!(matches!(
            quote.reject(jan(3)),
            Err(PolicyError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_accept_after_expiry_fails() {
        let mut quote = generated(jan(1));
        let later = jan(31) + Duration::seconds(1);
        assert_eq!(quote.effective_status(later), QuoteStatus::Expired);
        assert!(matches!(quote.accept(later), Err(PolicyError::QuoteExpired)));
        assert_eq!(quote.status(), QuoteStatus::Generated);
    }

    #[test]
    fn test_rejected_quote_does_not_expire() {
        let mut quote = generated(jan(1));
        quote.reject(jan(2)).unwrap();
        assert_eq!(quote.effective_status(jan(31) + Duration::days(10)), QuoteStatus::Rejected);
    }

    #[test]
    fn test_mark_converted_once() {
        let mut quote = generated(jan(1));
        assert!(quote.mark_converted(PolicyId::new(), jan(2)).is_err());

        quote.accept(jan(2)).unwrap();
        quote.mark_converted(PolicyId::new(), jan(3)).unwrap();
        assert!(matches!(
            quote.mark_converted(PolicyId::new(), jan(3)),
            Err(PolicyError::AlreadyConverted { .. })
        ));
    }

    #[test]
    fn test_release_conversion_only_for_claiming_policy() {
        let mut quote = generated(jan(1));
        quote.accept(jan(2)).unwrap();
        let policy_id = PolicyId::new();
        quote.mark_converted(policy_id, jan(3)).unwrap();

        assert!(!quote.release_conversion(PolicyId::new()));
        assert_eq!(quote.converted_policy_id(), Some(policy_id));
        assert!(quote.release_conversion(policy_id));
        assert_eq!(quote.converted_policy_id(), None);
        quote.mark_converted(PolicyId::new(), jan(4)).unwrap();
    }

    #[test]
    fn test_validation() {
        let mut bad = request();
        bad.policy_end_date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert!(matches!(bad.validate(), Err(PolicyError::Validation(_))));

        let mut bad = request();
        bad.commercial_discount = dec!(-5);
        assert!(bad.validate().is_err());

        let mut bad = request();
        bad.vehicle.horsepower = 0;
        assert!(bad.validate().is_err());

        assert!(request().validate().is_ok());
    }
}
