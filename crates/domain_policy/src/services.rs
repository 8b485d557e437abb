//! Quote and policy lifecycle services
//!
//! The services orchestrate the aggregates against the ports: they load a
//! record, let the aggregate enforce its rules, write it back with a version
//! check and then log the events the aggregate recorded.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use core_kernel::{
    ClientId, CoverageId, DocumentKind, DocumentNumber, Money, PolicyId, QuoteId, RecordStore,
    ServiceContext,
};
use domain_rating::{MotorCoverage, RatingEngine, RatingRequest};

use crate::aggregate::{EndorsementDetails, EndorsementEffect, Policy, PolicyStatus, PremiumDelta};
use crate::coverage::PolicyCoverage;
use crate::endorsement::{
    Endorsement, EndorsementChange, EndorsementPricing, EndorsementRequest, EndorsementSettings,
};
use crate::error::PolicyError;
use crate::events::PolicyEvent;
use crate::ports::ReferenceDataPort;
use crate::quote::{Quote, QuoteRequest};

fn publish(events: Vec<PolicyEvent>) {
    for event in events {
        info!(
            event_type = event.event_type(),
            timestamp = %event.timestamp(),
            "Domain event"
        );
    }
}

fn parse_number(number: &str) -> Result<DocumentNumber, PolicyError> {
    number
        .parse()
        .map_err(|e: core_kernel::NumberingError| PolicyError::validation(e.to_string()))
}

fn ensure_distinct(coverage_ids: &[CoverageId]) -> Result<(), PolicyError> {
    let mut seen = HashSet::new();
    match coverage_ids.iter().find(|id| !seen.insert(**id)) {
        Some(duplicate) => Err(PolicyError::validation(format!("coverage {} selected twice", duplicate))),
        None => Ok(()),
    }
}

/// Quote parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteSettings {
    pub validity_days: i64,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self { validity_days: 30 }
    }
}

/// Service for creating and deciding quotes
pub struct QuoteService {
    quotes: Arc<dyn RecordStore<Quote>>,
    reference: Arc<dyn ReferenceDataPort>,
    engine: RatingEngine,
    context: ServiceContext,
    settings: QuoteSettings,
}

impl QuoteService {
    pub fn new(
        quotes: Arc<dyn RecordStore<Quote>>,
        reference: Arc<dyn ReferenceDataPort>,
        engine: RatingEngine,
        context: ServiceContext,
    ) -> Self {
        Self {
            quotes,
            reference,
            engine,
            context,
            settings: QuoteSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: QuoteSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Rates and stores a new quote
    ///
    /// This method:
    /// 1. Validates the request
    /// 2. Checks every reference (client, product, vehicle, coverages, distributor)
    /// 3. Runs the rating engine
    /// 4. Allocates a `QTE-YYYY-MM-NNNN` number
    /// 5. Stores the quote as `Generated`, expiring after the validity period
    ///
    /// # Errors
    ///
    /// * `PolicyError::Validation` for malformed input
    /// * `NotFound` (as `PolicyError::NotFound` or `PolicyError::Port`) for an
    ///   unknown reference
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let quote = quote_service.create(request).await?;
    /// assert_eq!(quote.status(), QuoteStatus::Generated);
    /// ```
    pub async fn create(&self, request: QuoteRequest) -> Result<Quote, PolicyError> {
        request.validate()?;
        ensure_distinct(&request.coverage_ids)?;

        self.ensure_references(&request).await?;

        let coverages = self.reference.get_coverages(&request.coverage_ids).await?;
        if let Some(inactive) = coverages.iter().find(|c| !c.is_active) {
            return Err(PolicyError::validation(format!("coverage {} is not active", inactive.code)));
        }

        let distributor_type = match request.distributor_id {
            Some(id) => {
                let distributor = self.reference.get_distributor(id).await?;
                if !distributor.is_active {
                    return Err(PolicyError::validation(format!(
                        "distributor {} is not active",
                        distributor.code
                    )));
                }
                Some(distributor.distributor_type)
            }
            None => None,
        };

        let premium = self
            .engine
            .calculate(&request.rating_request(coverages, distributor_type))?;

        let now = self.context.now();
        let quote_number = self.context.next_number(DocumentKind::Quote, now).await?;
        let mut quote = Quote::generate(
            quote_number,
            request,
            distributor_type,
            premium,
            now,
            self.settings.validity_days,
        )?;

        let events = quote.take_events();
        let quote = self.quotes.insert(quote).await?;
        info!(
            quote_id = %quote.id(),
            quote_number = %quote.quote_number(),
            total_premium = %quote.premium().total_premium,
            "Quote generated"
        );
        publish(events);
        Ok(quote)
    }

    async fn ensure_references(&self, request: &QuoteRequest) -> Result<(), PolicyError> {
        if !self.reference.client_exists(request.client_id).await? {
            return Err(PolicyError::not_found("Client", request.client_id));
        }
        if !self.reference.product_exists(request.product_id).await? {
            return Err(PolicyError::not_found("Product", request.product_id));
        }
        let vehicle = &request.vehicle;
        if !self.reference.vehicle_category_exists(vehicle.category_id).await? {
            return Err(PolicyError::not_found("VehicleCategory", vehicle.category_id));
        }
        if !self.reference.vehicle_make_exists(vehicle.make_id).await? {
            return Err(PolicyError::not_found("VehicleMake", vehicle.make_id));
        }
        if !self.reference.vehicle_model_exists(vehicle.model_id).await? {
            return Err(PolicyError::not_found("VehicleModel", vehicle.model_id));
        }
        Ok(())
    }

    /// Accepts a generated, unexpired quote
    pub async fn accept(&self, id: QuoteId) -> Result<Quote, PolicyError> {
        let mut quote = self.quotes.get(id).await?;
        quote.accept(self.context.now())?;

        let events = quote.take_events();
        let quote = self.quotes.update(quote).await?;
        info!(quote_number = %quote.quote_number(), status = ?quote.status(), "Quote accepted");
        publish(events);
        Ok(quote)
    }

    /// Rejects a generated quote
    pub async fn reject(&self, id: QuoteId) -> Result<Quote, PolicyError> {
        let mut quote = self.quotes.get(id).await?;
        quote.reject(self.context.now())?;

        let events = quote.take_events();
        let quote = self.quotes.update(quote).await?;
        info!(quote_number = %quote.quote_number(), status = ?quote.status(), "Quote rejected");
        publish(events);
        Ok(quote)
    }

    pub async fn get_by_id(&self, id: QuoteId) -> Result<Quote, PolicyError> {
        Ok(self.quotes.get(id).await?)
    }

    /// Looks a quote up by its `QTE-...` number
    pub async fn get_by_number(&self, number: &str) -> Result<Quote, PolicyError> {
        let number = parse_number(number)?;
        self.quotes
            .find_first(&|q: &Quote| q.quote_number() == number)
            .await?
            .ok_or_else(|| PolicyError::not_found("Quote", number))
    }

    /// Quotes of a client, newest first
    pub async fn list_by_client(&self, client_id: ClientId) -> Result<Vec<Quote>, PolicyError> {
        let mut quotes = self
            .quotes
            .list_where(&|q: &Quote| q.client_id() == client_id)
            .await?;
        quotes.sort_by(|a, b| b.quote_date().cmp(&a.quote_date()));
        Ok(quotes)
    }
}

/// Service for policy issuance, status changes and endorsements
pub struct PolicyService {
    policies: Arc<dyn RecordStore<Policy>>,
    quotes: Arc<dyn RecordStore<Quote>>,
    reference: Arc<dyn ReferenceDataPort>,
    engine: RatingEngine,
    context: ServiceContext,
    endorsement_settings: EndorsementSettings,
}

impl PolicyService {
    pub fn new(
        policies: Arc<dyn RecordStore<Policy>>,
        quotes: Arc<dyn RecordStore<Quote>>,
        reference: Arc<dyn ReferenceDataPort>,
        engine: RatingEngine,
        context: ServiceContext,
    ) -> Self {
        Self {
            policies,
            quotes,
            reference,
            engine,
            context,
            endorsement_settings: EndorsementSettings::default(),
        }
    }

    pub fn with_endorsement_settings(mut self, settings: EndorsementSettings) -> Self {
        self.endorsement_settings = settings;
        self
    }

    /// Converts an accepted quote into a draft policy
    ///
    /// The policy number is allocated, then the quote is claimed (its
    /// converted-policy reference is written with a version check) and only
    /// then is the policy inserted, so two concurrent conversions of the same
    /// quote cannot both succeed. A failed insert releases the claim.
    ///
    /// # Errors
    ///
    /// * `PolicyError::InvalidStateTransition` unless the quote is accepted
    /// * `PolicyError::AlreadyConverted` if a policy exists for the quote
    pub async fn convert_from_quote(&self, quote_id: QuoteId) -> Result<Policy, PolicyError> {
        let now = self.context.now();
        let mut quote = self.quotes.get(quote_id).await?;
        let policy_id = PolicyId::new_v7();
        quote.mark_converted(policy_id, now)?;
        let quote_events = quote.take_events();

        let policy_number = self.context.next_number(DocumentKind::Policy, now).await?;
        let mut policy = Policy::from_quote(policy_id, policy_number, &quote, now)?;

        let quote = match self.quotes.update(quote).await {
            Ok(quote) => quote,
            Err(e) if e.is_conflict() => {
                let current = self.quotes.get(quote_id).await?;
                if current.converted_policy_id().is_some() {
                    warn!(quote_id = %quote_id, "Concurrent conversion lost the race");
                    return Err(PolicyError::AlreadyConverted { quote_id });
                }
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        let events = policy.take_events();
        let policy = match self.policies.insert(policy).await {
            Ok(policy) => policy,
            Err(e) => {
                self.release_quote(quote, policy_id).await;
                return Err(e.into());
            }
        };
        info!(
            policy_id = %policy.id(),
            policy_number = %policy.policy_number(),
            quote_number = %quote.quote_number(),
            "Policy issued from quote"
        );
        publish(quote_events);
        publish(events);
        Ok(policy)
    }

    /// Clears a conversion claim whose policy was never stored
    async fn release_quote(&self, mut quote: Quote, policy_id: PolicyId) {
        if !quote.release_conversion(policy_id) {
            return;
        }
        let quote_id = quote.id();
        match self.quotes.update(quote).await {
            Ok(_) => warn!(quote_id = %quote_id, "Conversion rolled back"),
            Err(e) => warn!(quote_id = %quote_id, error = %e, "Conversion claim could not be released"),
        }
    }

    /// Activates a draft policy on payment
    pub async fn activate(&self, id: PolicyId, payment_reference: &str) -> Result<Policy, PolicyError> {
        let mut policy = self.policies.get(id).await?;
        policy.activate(payment_reference, self.context.now())?;

        let events = policy.take_events();
        let policy = self.policies.update(policy).await?;
        info!(policy_number = %policy.policy_number(), status = ?policy.status(), "Policy activated");
        publish(events);
        Ok(policy)
    }

    /// Suspends an active policy
    pub async fn suspend(&self, id: PolicyId, reason: &str) -> Result<Policy, PolicyError> {
        let mut policy = self.policies.get(id).await?;
        if !policy.status().can_transition_to(&PolicyStatus::Suspended) {
            return Err(PolicyError::invalid_transition(policy.status(), "Suspended"));
        }

        let now = self.context.now();
        let number = self.context.next_number(DocumentKind::Endorsement, now).await?;
        policy.suspend(reason, number, now)?;

        let events = policy.take_events();
        let policy = self.policies.update(policy).await?;
        info!(policy_number = %policy.policy_number(), status = ?policy.status(), "Policy suspended");
        publish(events);
        Ok(policy)
    }

    /// Cancels a policy in any state but Cancelled
    pub async fn cancel(&self, id: PolicyId, reason: &str) -> Result<Policy, PolicyError> {
        let mut policy = self.policies.get(id).await?;
        if !policy.status().can_transition_to(&PolicyStatus::Cancelled) {
            return Err(PolicyError::invalid_transition(policy.status(), "Cancelled"));
        }

        let now = self.context.now();
        let number = self.context.next_number(DocumentKind::Endorsement, now).await?;
        policy.cancel(reason, number, now)?;

        let events = policy.take_events();
        let policy = self.policies.update(policy).await?;
        info!(policy_number = %policy.policy_number(), status = ?policy.status(), "Policy cancelled");
        publish(events);
        Ok(policy)
    }

    /// Prices and applies an endorsement
    ///
    /// Coverage changes are priced according to the configured
    /// [`EndorsementPricing`]; a vehicle value change is charged
    /// `(new - old) x vehicle_value_rate`.
    ///
    /// # Errors
    ///
    /// * `PolicyError::InvalidStateTransition` on a cancelled policy
    /// * `NotFound` for an unknown coverage, or removing a coverage the policy does not hold
    /// * `PolicyError::Validation` for a non-positive vehicle value or a coverage already held
    pub async fn create_endorsement(
        &self,
        policy_id: PolicyId,
        request: EndorsementRequest,
    ) -> Result<Endorsement, PolicyError> {
        let mut policy = self.policies.get(policy_id).await?;
        if policy.status() == PolicyStatus::Cancelled {
            return Err(PolicyError::invalid_transition(policy.status(), "Endorsed"));
        }
        let currency = policy.premium().currency;

        let (effect, delta) = match &request.change {
            EndorsementChange::AddCoverage { coverage_ids } => {
                ensure_distinct(coverage_ids)?;
                let added = self.reference.get_coverages(coverage_ids).await?;
                if let Some(inactive) = added.iter().find(|c| !c.is_active) {
                    return Err(PolicyError::validation(format!("coverage {} is not active", inactive.code)));
                }
                if let Some(held) = added.iter().find(|c| policy.has_active_coverage(c.id)) {
                    return Err(PolicyError::validation(format!(
                        "coverage {} is already active on this policy",
                        held.code
                    )));
                }
                let delta = self.price_coverage_change(&policy, &added, &[]).await?;
                let bound = added
                    .iter()
                    .map(|c| PolicyCoverage::from_catalogue(c, currency))
                    .collect();
                (EndorsementEffect::AddCoverages(bound), delta)
            }
            EndorsementChange::RemoveCoverage { coverage_ids } => {
                ensure_distinct(coverage_ids)?;
                if let Some(missing) = coverage_ids.iter().find(|id| !policy.has_active_coverage(**id)) {
                    return Err(PolicyError::not_found("PolicyCoverage", missing));
                }
                let delta = self.price_coverage_change(&policy, &[], coverage_ids).await?;
                (EndorsementEffect::RemoveCoverages(coverage_ids.clone()), delta)
            }
            EndorsementChange::ChangeVehicleValue { new_value } => {
                if !new_value.is_positive() {
                    return Err(PolicyError::validation("vehicle value must be positive"));
                }
                let adjustment = new_value
                    .checked_sub(&policy.vehicle().vehicle_value)?
                    .multiply(self.endorsement_settings.vehicle_value_rate);
                let delta = PremiumDelta {
                    total: adjustment,
                    sections: Money::zero(currency),
                };
                (EndorsementEffect::ChangeVehicleValue(*new_value), delta)
            }
        };

        let now = self.context.now();
        let endorsement_number = self.context.next_number(DocumentKind::Endorsement, now).await?;
        let details = EndorsementDetails {
            endorsement_number,
            description: request.description,
            effective_date: request.effective_date,
            reason: request.reason,
        };
        let endorsement = policy.apply_endorsement(effect, delta, details, now)?;

        let events = policy.take_events();
        let policy = self.policies.update(policy).await?;
        info!(
            policy_number = %policy.policy_number(),
            endorsement_number = %endorsement.endorsement_number,
            endorsement_type = %endorsement.endorsement_type,
            premium_adjustment = %endorsement.premium_adjustment,
            "Endorsement applied"
        );
        publish(events);
        Ok(endorsement)
    }

    async fn price_coverage_change(
        &self,
        policy: &Policy,
        added: &[MotorCoverage],
        removed: &[CoverageId],
    ) -> Result<PremiumDelta, PolicyError> {
        let currency = policy.premium().currency;
        if added.is_empty() && removed.is_empty() {
            return Ok(PremiumDelta::none(currency));
        }

        match self.endorsement_settings.pricing {
            EndorsementPricing::Flat => {
                let amount = Money::new(self.endorsement_settings.flat_coverage_amount, currency);
                let signed = if added.is_empty() { -amount } else { amount };
                Ok(PremiumDelta {
                    total: signed,
                    sections: signed,
                })
            }
            EndorsementPricing::Rerate => {
                let held: Vec<CoverageId> = policy.active_coverages().map(|c| c.coverage_id).collect();
                let current = self.reference.get_coverages(&held).await?;
                let mut proposed: Vec<MotorCoverage> = current
                    .iter()
                    .filter(|c| !removed.contains(&c.id))
                    .cloned()
                    .collect();
                proposed.extend(added.iter().cloned());

                let before = self.engine.calculate(&Self::rating_request(policy, current))?;
                let after = self.engine.calculate(&Self::rating_request(policy, proposed))?;
                debug!(
                    before = %before.total_premium,
                    after = %after.total_premium,
                    "Coverage change re-rated"
                );

                Ok(PremiumDelta {
                    total: after.total_premium.checked_sub(&before.total_premium)?,
                    sections: after.sections_premium.checked_sub(&before.sections_premium)?,
                })
            }
        }
    }

    fn rating_request(policy: &Policy, coverages: Vec<MotorCoverage>) -> RatingRequest {
        let vehicle = policy.vehicle();
        let premium = policy.premium();
        let mut request = RatingRequest::new(
            vehicle.vehicle_value,
            vehicle.horsepower,
            vehicle.fuel_type,
            policy.duration_months(),
        )
        .with_coverages(coverages)
        .with_discounts(premium.professional_discount, premium.commercial_discount);
        if let Some(distributor_type) = policy.distributor_type() {
            request = request.with_distributor(distributor_type);
        }
        request
    }

    pub async fn get_by_id(&self, id: PolicyId) -> Result<Policy, PolicyError> {
        Ok(self.policies.get(id).await?)
    }

    /// Looks a policy up by its `POL-...` number
    pub async fn get_by_number(&self, number: &str) -> Result<Policy, PolicyError> {
        let number = parse_number(number)?;
        self.policies
            .find_first(&|p: &Policy| p.policy_number() == number)
            .await?
            .ok_or_else(|| PolicyError::not_found("Policy", number))
    }

    /// Policies of a client, newest first
    pub async fn list_by_client(&self, client_id: ClientId) -> Result<Vec<Policy>, PolicyError> {
        let mut policies = self
            .policies
            .list_where(&|p: &Policy| p.client_id() == client_id)
            .await?;
        policies.sort_by(|a, b| b.policy_date().cmp(&a.policy_date()));
        Ok(policies)
    }

    /// Endorsements of a policy, newest first
    pub async fn list_endorsements(&self, policy_id: PolicyId) -> Result<Vec<Endorsement>, PolicyError> {
        let policy = self.policies.get(policy_id).await?;
        Ok(policy.endorsements().iter().rev().cloned().collect())
    }

    /// Sum of premium adjustments applied to a policy so far
    pub async fn total_adjustments(&self, policy_id: PolicyId) -> Result<Decimal, PolicyError> {
        let policy = self.policies.get(policy_id).await?;
        Ok(policy
            .endorsements()
            .iter()
            .map(|e| e.premium_adjustment.amount())
            .sum())
    }
}
