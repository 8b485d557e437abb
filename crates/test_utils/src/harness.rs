//! Service harness
//!
//! Wires the quote, policy and claim services to the in-memory adapters and a
//! manual clock, with one client, product and vehicle already registered.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use core_kernel::{
    ClientId, ManualClock, ProductId, RecordStore, ServiceContext, Timezone, VehicleCategoryId,
    VehicleMakeId, VehicleModelId,
};
use domain_claims::ClaimService;
use domain_policy::{EndorsementSettings, Policy, PolicyService, Quote, QuoteService};
use domain_rating::{MotorCoverage, RatingEngine};
use infra_store::{
    InMemoryRecordStore, InMemoryReferenceData, InMemorySequenceGenerator, PolicyStoreLookup,
};

use crate::builders::QuoteRequestBuilder;
use crate::fixtures::{TemporalFixtures, VehicleFixtures};

/// Fully wired services over in-memory state
pub struct TestHarness {
    pub clock: Arc<ManualClock>,
    pub sequences: InMemorySequenceGenerator,
    pub reference: InMemoryReferenceData,
    pub quotes: InMemoryRecordStore<Quote>,
    pub policies: InMemoryRecordStore<Policy>,
    pub claims: InMemoryRecordStore<domain_claims::Claim>,
    pub quote_service: QuoteService,
    pub policy_service: PolicyService,
    pub claim_service: ClaimService,
    pub client_id: ClientId,
    pub product_id: ProductId,
    pub category_id: VehicleCategoryId,
    pub make_id: VehicleMakeId,
    pub model_id: VehicleModelId,
}

impl TestHarness {
    /// Harness with default endorsement pricing (re-rating)
    pub async fn new() -> Self {
        Self::with_endorsement_settings(EndorsementSettings::default()).await
    }

    pub async fn with_endorsement_settings(settings: EndorsementSettings) -> Self {
        let clock = Arc::new(ManualClock::new(TemporalFixtures::now()));
        let sequences = InMemorySequenceGenerator::new();
        let reference = InMemoryReferenceData::with_standard_catalogue().await;
        let quotes = InMemoryRecordStore::<Quote>::new();
        let policies = InMemoryRecordStore::<Policy>::new();
        let claims = InMemoryRecordStore::<domain_claims::Claim>::new();

        let client_id = ClientId::new();
        let product_id = ProductId::new();
        let category_id = VehicleCategoryId::new();
        let make_id = VehicleMakeId::new();
        let model_id = VehicleModelId::new();
        reference.add_client(client_id).await;
        reference.add_product(product_id).await;
        reference.add_vehicle(category_id, make_id, model_id).await;

        let context = ServiceContext::new(Arc::new(sequences.clone()), clock.clone(), Timezone::default());
        let engine = RatingEngine::with_defaults();
        let policy_store: Arc<dyn RecordStore<Policy>> = Arc::new(policies.clone());

        let quote_service = QuoteService::new(
            Arc::new(quotes.clone()),
            Arc::new(reference.clone()),
            engine.clone(),
            context.clone(),
        );
        let policy_service = PolicyService::new(
            policy_store.clone(),
            Arc::new(quotes.clone()),
            Arc::new(reference.clone()),
            engine,
            context.clone(),
        )
        .with_endorsement_settings(settings);
        let claim_service = ClaimService::new(
            Arc::new(claims.clone()),
            Arc::new(PolicyStoreLookup::new(policy_store)),
            context,
        );

        Self {
            clock,
            sequences,
            reference,
            quotes,
            policies,
            claims,
            quote_service,
            policy_service,
            claim_service,
            client_id,
            product_id,
            category_id,
            make_id,
            model_id,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        use core_kernel::Clock;
        self.clock.now()
    }

    /// Quote request for the registered client, product and vehicle
    pub fn quote_request(&self) -> QuoteRequestBuilder {
        QuoteRequestBuilder::new()
            .client(self.client_id)
            .product(self.product_id)
            .vehicle(VehicleFixtures::saloon(self.category_id, self.make_id, self.model_id))
    }

    /// Catalogue coverage by code
    ///
    /// # Panics
    ///
    /// Panics if the code is not in the standard catalogue
    pub async fn coverage(&self, code: &str) -> MotorCoverage {
        self.reference
            .coverage_by_code(code)
            .await
            .unwrap_or_else(|| panic!("unknown coverage code {}", code))
    }

    /// Generates, accepts and converts a quote with the given coverages
    pub async fn issue_policy(&self, coverage_codes: &[&str]) -> Policy {
        let mut coverage_ids = Vec::new();
        for code in coverage_codes {
            coverage_ids.push(self.coverage(code).await.id);
        }
        let quote = self
            .quote_service
            .create(self.quote_request().coverages(coverage_ids).build())
            .await
            .expect("quote should be generated");
        self.quote_service.accept(quote.id()).await.expect("quote should be accepted");
        self.policy_service
            .convert_from_quote(quote.id())
            .await
            .expect("quote should convert")
    }

    /// Issues and activates a policy
    pub async fn active_policy(&self, coverage_codes: &[&str]) -> Policy {
        let policy = self.issue_policy(coverage_codes).await;
        self.policy_service
            .activate(policy.id(), "PAY-TEST-001")
            .await
            .expect("policy should activate")
    }
}
