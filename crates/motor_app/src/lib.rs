//! Motor Insurance Core - Application Wiring
//!
//! Loads [`MotorConfig`], installs tracing and assembles the quote, policy and
//! claim services over the in-memory adapters.
//!
//! # Example
//!
//! ```rust,ignore
//! let core = motor_app::bootstrap().await?;
//! core.reference.add_client(client_id).await;
//! let quote = core.quote_service.create(request).await?;
//! ```

pub mod config;
pub mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use core_kernel::{Clock, Currency, RecordStore, ServiceContext, SystemClock};
use domain_claims::{Claim, ClaimService};
use domain_policy::{Policy, PolicyService, Quote, QuoteService};
use domain_rating::RatingEngine;
use infra_store::{
    InMemoryRecordStore, InMemoryReferenceData, InMemorySequenceGenerator, PolicyStoreLookup,
};

pub use crate::config::{ConfigError, LogFormat, MotorConfig};

/// Services and adapters built from one configuration
pub struct MotorCore {
    pub config: MotorConfig,
    pub engine: RatingEngine,
    pub reference: InMemoryReferenceData,
    pub sequences: InMemorySequenceGenerator,
    pub quotes: InMemoryRecordStore<Quote>,
    pub policies: InMemoryRecordStore<Policy>,
    pub claims: InMemoryRecordStore<Claim>,
    pub quote_service: QuoteService,
    pub policy_service: PolicyService,
    pub claim_service: ClaimService,
}

impl MotorCore {
    /// Wires the services on the system clock
    pub async fn from_config(config: MotorConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Wires the services on the given clock, with the standard coverage catalogue loaded
    pub async fn with_clock(config: MotorConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;

        let engine = RatingEngine::new(Arc::new(config.rate_tables()), config.rating_settings());
        let reference = InMemoryReferenceData::with_standard_catalogue().await;
        let sequences = InMemorySequenceGenerator::new();
        let quotes = InMemoryRecordStore::<Quote>::new();
        let policies = InMemoryRecordStore::<Policy>::new();
        let claims = InMemoryRecordStore::<Claim>::new();

        let context = ServiceContext::new(Arc::new(sequences.clone()), clock, config.business_timezone);
        let policy_store: Arc<dyn RecordStore<Policy>> = Arc::new(policies.clone());

        let quote_service = QuoteService::new(
            Arc::new(quotes.clone()),
            Arc::new(reference.clone()),
            engine.clone(),
            context.clone(),
        )
        .with_settings(config.quote_settings());
        let policy_service = PolicyService::new(
            policy_store.clone(),
            Arc::new(quotes.clone()),
            Arc::new(reference.clone()),
            engine.clone(),
            context.clone(),
        )
        .with_endorsement_settings(config.endorsement.clone());
        let claim_service = ClaimService::new(
            Arc::new(claims.clone()),
            Arc::new(PolicyStoreLookup::new(policy_store)),
            context,
        );

        tracing::info!(
            timezone = %config.business_timezone,
            currency = %config.currency,
            endorsement_pricing = ?config.endorsement.pricing,
            "Motor core wired"
        );

        Ok(Self {
            config,
            engine,
            reference,
            sequences,
            quotes,
            policies,
            claims,
            quote_service,
            policy_service,
            claim_service,
        })
    }

    /// Currency amounts are entered in
    pub fn currency(&self) -> Currency {
        self.config.currency
    }
}

/// Loads configuration, installs tracing and wires the services
pub async fn bootstrap() -> anyhow::Result<MotorCore> {
    let config = MotorConfig::load().context("loading motor configuration")?;
    telemetry::init_tracing(&config.log_level, config.log_format)
        .context("installing tracing subscriber")?;
    let core = MotorCore::from_config(config)
        .await
        .context("wiring motor services")?;
    Ok(core)
}
