//! Motor core configuration
//!
//! Values are layered, later sources winning:
//!
//! 1. built-in defaults
//! 2. the file named by `MOTOR_CONFIG_FILE` (TOML, JSON or YAML by extension)
//! 3. `MOTOR_*` environment variables, `__` separating nested keys
//!
//! ```bash
//! MOTOR_LOG_FORMAT=json
//! MOTOR_BUSINESS_TIMEZONE=Africa/Douala
//! MOTOR_ENDORSEMENT__PRICING=flat
//! ```

use std::path::Path;

use core_kernel::{Currency, Timezone};
use domain_policy::{EndorsementSettings, QuoteSettings};
use domain_rating::{RateTables, RatingError, RatingSettings};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an optional configuration file
pub const CONFIG_FILE_VAR: &str = "MOTOR_CONFIG_FILE";

const ENV_PREFIX: &str = "MOTOR";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("Invalid rate tables: {0}")]
    RateTables(#[from] RatingError),
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Settings for the rating engine, lifecycle services and tracing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    /// Log level filter, used when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: LogFormat,
    /// Zone used for local dates and numbering periods
    pub business_timezone: Timezone,
    pub currency: Currency,
    pub quote_validity_days: i64,
    /// Percentage of vehicle value applied when no rating factor matches
    pub default_rating_factor: Decimal,
    pub default_short_term_coefficient: Decimal,
    pub default_policy_cost: Decimal,
    pub policy_cost_product_code: String,
    pub endorsement: EndorsementSettings,
    /// Replaces the built-in CIMA tables when present
    pub rate_tables: Option<RateTables>,
}

impl Default for MotorConfig {
    fn default() -> Self {
        let rating = RatingSettings::default();
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            business_timezone: Timezone::default(),
            currency: Currency::XOF,
            quote_validity_days: QuoteSettings::default().validity_days,
            default_rating_factor: rating.default_rating_factor,
            default_short_term_coefficient: rating.default_short_term_coefficient,
            default_policy_cost: rating.default_policy_cost,
            policy_cost_product_code: rating.policy_cost_product_code,
            endorsement: EndorsementSettings::default(),
            rate_tables: None,
        }
    }
}

impl MotorConfig {
    /// Loads configuration from `.env`, the optional file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let file = std::env::var(CONFIG_FILE_VAR).ok();
        Self::from_sources(
            file.as_deref().map(Path::new),
            config::Environment::with_prefix(ENV_PREFIX),
        )
    }

    /// Builds configuration from an explicit file and environment source
    pub fn from_sources(
        file: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings: MotorConfig = builder
            .add_source(environment.prefix_separator("_").separator("__"))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quote_validity_days <= 0 {
            return Err(ConfigError::invalid(
                "quote_validity_days",
                format!("must be positive, got {}", self.quote_validity_days),
            ));
        }
        if self.default_rating_factor <= Decimal::ZERO {
            return Err(ConfigError::invalid(
                "default_rating_factor",
                "must be a positive percentage",
            ));
        }
        if self.default_short_term_coefficient <= Decimal::ZERO
            || self.default_short_term_coefficient > dec!(1)
        {
            return Err(ConfigError::invalid(
                "default_short_term_coefficient",
                "must be in (0, 1]",
            ));
        }
        if self.default_policy_cost < Decimal::ZERO {
            return Err(ConfigError::invalid("default_policy_cost", "must not be negative"));
        }
        if self.endorsement.vehicle_value_rate < Decimal::ZERO {
            return Err(ConfigError::invalid(
                "endorsement.vehicle_value_rate",
                "must not be negative",
            ));
        }
        if let Some(tables) = &self.rate_tables {
            tables.validate()?;
        }
        Ok(())
    }

    pub fn rating_settings(&self) -> RatingSettings {
        RatingSettings {
            default_rating_factor: self.default_rating_factor,
            default_short_term_coefficient: self.default_short_term_coefficient,
            default_policy_cost: self.default_policy_cost,
            policy_cost_product_code: self.policy_cost_product_code.clone(),
        }
    }

    pub fn quote_settings(&self) -> QuoteSettings {
        QuoteSettings {
            validity_days: self.quote_validity_days,
        }
    }

    /// Configured tables, or the CIMA defaults
    pub fn rate_tables(&self) -> RateTables {
        self.rate_tables
            .clone()
            .unwrap_or_else(RateTables::cima_defaults)
    }
}
