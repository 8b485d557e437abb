//! Premium rating engine
//!
//! A pure function from rating inputs to an itemized [`PremiumBreakdown`].
//! Every table lookup has a default, so a valid request always rates.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use core_kernel::{CoverageId, Currency, Money, Rate};

use crate::commission::CommissionCalculator;
use crate::error::RatingError;
use crate::reference::{DistributorType, FuelType, MotorCoverage, ProductType};
use crate::tables::RateTables;
use crate::tax::TaxCalculator;

/// Fallbacks applied when a table has no matching row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    /// Percentage of vehicle value
    pub default_rating_factor: Decimal,
    pub default_short_term_coefficient: Decimal,
    pub default_policy_cost: Decimal,
    /// Product code used to select policy cost brackets
    pub policy_cost_product_code: String,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            default_rating_factor: dec!(2.50),
            default_short_term_coefficient: dec!(1.0),
            default_policy_cost: dec!(1000),
            policy_cost_product_code: "MOTOR".to_string(),
        }
    }
}

/// Inputs to a rating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRequest {
    pub vehicle_value: Money,
    /// Fiscal horsepower (CV)
    pub horsepower: u32,
    pub fuel_type: FuelType,
    pub duration_months: u32,
    /// Selected catalogue entries; each carries its flat premium
    pub coverages: Vec<MotorCoverage>,
    /// Percent, e.g. `5` for 5%
    pub professional_discount: Decimal,
    /// Percent
    pub commercial_discount: Decimal,
    pub distributor_type: Option<DistributorType>,
}

impl RatingRequest {
    /// A request with no coverages, no discounts and no distributor
    pub fn new(vehicle_value: Money, horsepower: u32, fuel_type: FuelType, duration_months: u32) -> Self {
        Self {
            vehicle_value,
            horsepower,
            fuel_type,
            duration_months,
            coverages: Vec::new(),
            professional_discount: Decimal::ZERO,
            commercial_discount: Decimal::ZERO,
            distributor_type: None,
        }
    }

    pub fn with_coverages(mut self, coverages: Vec<MotorCoverage>) -> Self {
        self.coverages = coverages;
        self
    }

    pub fn with_discounts(mut self, professional: Decimal, commercial: Decimal) -> Self {
        self.professional_discount = professional;
        self.commercial_discount = commercial;
        self
    }

    pub fn with_distributor(mut self, distributor_type: DistributorType) -> Self {
        self.distributor_type = Some(distributor_type);
        self
    }

    fn validate(&self) -> Result<(), RatingError> {
        if !self.vehicle_value.is_positive() {
            return Err(RatingError::invalid_input("vehicle value must be positive"));
        }
        if self.horsepower == 0 {
            return Err(RatingError::invalid_input("horsepower must be positive"));
        }
        if self.duration_months == 0 {
            return Err(RatingError::invalid_input("duration must be at least one month"));
        }
        if self.professional_discount.is_sign_negative() || self.commercial_discount.is_sign_negative() {
            return Err(RatingError::invalid_input("discounts cannot be negative"));
        }
        if self.professional_discount + self.commercial_discount > dec!(100) {
            return Err(RatingError::invalid_input("combined discounts cannot exceed 100%"));
        }
        Ok(())
    }
}

/// Premium attributed to one selected coverage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoveragePremium {
    pub coverage_id: CoverageId,
    pub code: String,
    pub name: String,
    pub premium_amount: Money,
}

/// Every intermediate of a rating
///
/// Stored verbatim on the quote and copied onto the policy at conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumBreakdown {
    pub currency: Currency,
    /// Percentage of vehicle value
    pub rating_factor: Decimal,
    pub base_premium: Money,
    pub coverages: Vec<CoveragePremium>,
    pub sections_premium: Money,
    pub subtotal: Money,
    pub professional_discount: Decimal,
    pub commercial_discount: Decimal,
    pub total_discount: Money,
    pub net_premium_before_short_term: Money,
    pub short_term_coefficient: Decimal,
    pub net_premium: Money,
    pub tax_rate: Rate,
    pub tax_amount: Money,
    pub policy_cost_amount: Money,
    pub total_premium: Money,
    pub commission_rate: Option<Rate>,
    pub commission_amount: Option<Money>,
}

/// The rating engine
#[derive(Debug, Clone)]
pub struct RatingEngine {
    tables: Arc<RateTables>,
    settings: RatingSettings,
}

impl RatingEngine {
    pub fn new(tables: Arc<RateTables>, settings: RatingSettings) -> Self {
        Self { tables, settings }
    }

    /// Engine over the CIMA default tables and default fallbacks
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(RateTables::cima_defaults()), RatingSettings::default())
    }

    pub fn tables(&self) -> &RateTables {
        &self.tables
    }

    pub fn settings(&self) -> &RatingSettings {
        &self.settings
    }

    /// Rates a request
    ///
    /// # Errors
    ///
    /// Returns `RatingError::InvalidInput` for a non-positive vehicle value,
    /// zero horsepower or duration, negative discounts or discounts above 100%
    /// in total. Missing table rows never fail.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let breakdown = engine.calculate(
    ///     &RatingRequest::new(Money::new(dec!(5000000), Currency::XOF), 9, FuelType::Essence, 3),
    /// )?;
    /// assert_eq!(breakdown.net_premium.amount(), dec!(60000));
    /// ```
    pub fn calculate(&self, request: &RatingRequest) -> Result<PremiumBreakdown, RatingError> {
        request.validate()?;
        let currency = request.vehicle_value.currency();

        let rating_factor = self
            .tables
            .rating_factor(request.horsepower, request.fuel_type)
            .map(|f| f.rate_percentage)
            .unwrap_or(self.settings.default_rating_factor);
        let base_premium = Money::new(
            percentage_of(request.vehicle_value.amount(), rating_factor)?,
            currency,
        );

        let coverages: Vec<CoveragePremium> = request
            .coverages
            .iter()
            .map(|c| CoveragePremium {
                coverage_id: c.id,
                code: c.code.clone(),
                name: c.name.clone(),
                premium_amount: Money::new(c.fixed_premium, currency),
            })
            .collect();
        let sections_premium = Money::sum(currency, coverages.iter().map(|c| &c.premium_amount))?;

        let subtotal = base_premium.checked_add(&sections_premium)?;
        let discount_percentage = request.professional_discount + request.commercial_discount;
        let total_discount =
            Money::new(percentage_of(subtotal.amount(), discount_percentage)?, currency);
        let net_premium_before_short_term = subtotal.checked_sub(&total_discount)?;

        let short_term_coefficient = self
            .tables
            .short_term_coefficient(request.duration_months)
            .unwrap_or(self.settings.default_short_term_coefficient);
        let net_premium = Money::new(
            checked_product(net_premium_before_short_term.amount(), short_term_coefficient)?,
            currency,
        );

        let tax_rate = TaxCalculator::new(&self.tables).principal_tax_rate(ProductType::Motor);
        let tax_amount = tax_rate.apply(&net_premium);

        let policy_cost = self
            .tables
            .policy_cost(&self.settings.policy_cost_product_code, net_premium.amount())
            .unwrap_or(self.settings.default_policy_cost);
        let policy_cost_amount = Money::new(policy_cost, currency);

        let total_premium = net_premium
            .checked_add(&tax_amount)?
            .checked_add(&policy_cost_amount)?;

        let (commission_rate, commission_amount) = match request.distributor_type {
            Some(distributor_type) => {
                let commission = CommissionCalculator::new(&self.tables).calculate(
                    distributor_type,
                    ProductType::Motor,
                    net_premium,
                    None,
                )?;
                (Some(commission.rate), Some(commission.commission_amount))
            }
            None => (None, None),
        };

        tracing::debug!(
            horsepower = request.horsepower,
            fuel_type = %request.fuel_type,
            duration_months = request.duration_months,
            %net_premium,
            %total_premium,
            "Premium rated"
        );

        Ok(PremiumBreakdown {
            currency,
            rating_factor,
            base_premium,
            coverages,
            sections_premium,
            subtotal,
            professional_discount: request.professional_discount,
            commercial_discount: request.commercial_discount,
            total_discount,
            net_premium_before_short_term,
            short_term_coefficient,
            net_premium,
            tax_rate,
            tax_amount,
            policy_cost_amount,
            total_premium,
            commission_rate,
            commission_amount,
        })
    }
}

impl Default for RatingEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn checked_product(amount: Decimal, factor: Decimal) -> Result<Decimal, RatingError> {
    amount.checked_mul(factor).ok_or_else(|| {
        RatingError::invalid_input(format!("premium for {} exceeds the representable range", amount))
    })
}

/// `amount * percentage / 100`, failing instead of overflowing
fn percentage_of(amount: Decimal, percentage: Decimal) -> Result<Decimal, RatingError> {
    Ok(checked_product(amount, percentage)? / dec!(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xof(amount: Decimal) -> Money {
        Money::new(amount, Currency::XOF)
    }

    #[test]
    fn test_annual_essence_nine_horsepower() {
        let engine = RatingEngine::with_defaults();
        let breakdown = engine
            .calculate(&RatingRequest::new(xof(dec!(5000000)), 9, FuelType::Essence, 12))
            .unwrap();

        assert_eq!(breakdown.rating_factor, dec!(3.00));
        assert_eq!(breakdown.base_premium.amount(), dec!(150000));
        assert_eq!(breakdown.sections_premium.amount(), dec!(0));
        assert_eq!(breakdown.net_premium.amount(), dec!(150000));
        assert_eq!(breakdown.tax_amount.amount(), dec!(21750));
        assert_eq!(breakdown.policy_cost_amount.amount(), dec!(3000));
        assert_eq!(breakdown.total_premium.amount(), dec!(174750));
        assert!(breakdown.commission_amount.is_none());
    }

    #[test]
    fn test_unmatched_lookups_use_defaults() {
        let engine = RatingEngine::new(Arc::new(RateTables::empty()), RatingSettings::default());
        let breakdown = engine
            .calculate(&RatingRequest::new(xof(dec!(1000000)), 9, FuelType::Electric, 5))
            .unwrap();

        assert_eq!(breakdown.rating_factor, dec!(2.50));
        assert_eq!(breakdown.short_term_coefficient, dec!(1.0));
        assert_eq!(breakdown.net_premium.amount(), dec!(25000));
        assert_eq!(breakdown.policy_cost_amount.amount(), dec!(1000));
    }

    #[test]
    fn test_discounts_and_coverages() {
        let engine = RatingEngine::with_defaults();
        let coverages: Vec<MotorCoverage> = MotorCoverage::standard_catalogue()
            .into_iter()
            .filter(|c| c.code == "SECTION_B" || c.code == "SECTION_H")
            .collect();
        let request = RatingRequest::new(xof(dec!(2000000)), 6, FuelType::Diesel, 12)
            .with_coverages(coverages)
            .with_discounts(dec!(5), dec!(5));

        let breakdown = engine.calculate(&request).unwrap();

        assert_eq!(breakdown.base_premium.amount(), dec!(50000));
        assert_eq!(breakdown.sections_premium.amount(), dec!(13000));
        assert_eq!(breakdown.subtotal.amount(), dec!(63000));
        assert_eq!(breakdown.total_discount.amount(), dec!(6300));
        assert_eq!(breakdown.net_premium.amount(), dec!(56700));
        assert_eq!(breakdown.coverages.len(), 2);
        assert_eq!(breakdown.policy_cost_amount.amount(), dec!(2000));
    }

    #[test]
    fn test_commission_uses_fractional_rate() {
        let engine = RatingEngine::with_defaults();
        let request = RatingRequest::new(xof(dec!(5000000)), 9, FuelType::Essence, 12)
            .with_distributor(DistributorType::InternalAgent);

        let breakdown = engine.calculate(&request).unwrap();

        assert_eq!(breakdown.commission_rate.unwrap().as_decimal(), dec!(0.10));
        assert_eq!(breakdown.commission_amount.unwrap().amount(), dec!(15000));
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let engine = RatingEngine::with_defaults();
        let zero_value = RatingRequest::new(xof(dec!(0)), 9, FuelType::Essence, 12);
        let zero_hp = RatingRequest::new(xof(dec!(1000)), 0, FuelType::Essence, 12);
        let zero_months = RatingRequest::new(xof(dec!(1000)), 9, FuelType::Essence, 0);
        let big_discount = RatingRequest::new(xof(dec!(1000)), 9, FuelType::Essence, 12)
            .with_discounts(dec!(60), dec!(41));

        for request in [zero_value, zero_hp, zero_months, big_discount] {
            assert!(matches!(
                engine.calculate(&request),
                Err(RatingError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_huge_vehicle_value_fails_without_overflow() {
        let engine = RatingEngine::with_defaults();
        for amount in [Decimal::MAX, Decimal::MAX / dec!(2)] {
            let request = RatingRequest::new(xof(amount), 9, FuelType::Essence, 12);
            assert!(matches!(
                engine.calculate(&request),
                Err(RatingError::InvalidInput(_))
            ));
        }
    }
}
