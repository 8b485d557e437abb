//! Rate tables
//!
//! Pure data plus range lookup. Missing rows are not errors here: the engine
//! and calculators apply their documented defaults when a lookup returns
//! `None`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RatingError;
use crate::reference::{DistributorType, FuelType, ProductType};

/// Rating factor for a horsepower band and fuel type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingFactor {
    pub horsepower_min: u32,
    pub horsepower_max: u32,
    pub fuel_type: FuelType,
    /// Percentage of vehicle value, e.g. `3.00` for 3%
    pub rate_percentage: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl RatingFactor {
    pub fn new(horsepower_min: u32, horsepower_max: u32, fuel_type: FuelType, rate_percentage: Decimal) -> Self {
        Self {
            horsepower_min,
            horsepower_max,
            fuel_type,
            rate_percentage,
            is_active: true,
        }
    }

    /// Inclusive on both bounds
    pub fn matches(&self, horsepower: u32, fuel_type: FuelType) -> bool {
        self.is_active
            && self.fuel_type == fuel_type
            && self.horsepower_min <= horsepower
            && horsepower <= self.horsepower_max
    }
}

/// Multiplier for contracts shorter than a year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortTermFactor {
    pub months: u32,
    pub coefficient: Decimal,
}

/// Flat policy cost charged for a band of net premium
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCostBracket {
    pub product_code: String,
    pub net_premium_min: Decimal,
    /// `None` means unbounded
    pub net_premium_max: Option<Decimal>,
    pub cost_amount: Decimal,
}

impl PolicyCostBracket {
    pub fn new(product_code: &str, min: Decimal, max: Option<Decimal>, cost_amount: Decimal) -> Self {
        Self {
            product_code: product_code.to_string(),
            net_premium_min: min,
            net_premium_max: max,
            cost_amount,
        }
    }

    pub fn contains(&self, net_premium: Decimal) -> bool {
        self.net_premium_min <= net_premium
            && self.net_premium_max.map_or(true, |max| net_premium <= max)
    }
}

/// Commission rate for a distributor type on a line of business
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRate {
    pub distributor_type: DistributorType,
    pub product_type: ProductType,
    /// Fraction, e.g. `0.10` for 10%
    pub rate: Decimal,
}

/// A tax or fee levied on net premium
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTaxRate {
    pub product_type: ProductType,
    pub tax_name: String,
    /// Fraction, e.g. `0.145` for 14.5%
    pub rate: Decimal,
    pub is_fee: bool,
}

impl ProductTaxRate {
    pub fn new(product_type: ProductType, tax_name: &str, rate: Decimal, is_fee: bool) -> Self {
        Self {
            product_type,
            tax_name: tax_name.to_string(),
            rate,
            is_fee,
        }
    }
}

/// All lookup tables consulted by the rating engine and calculators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateTables {
    pub rating_factors: Vec<RatingFactor>,
    pub short_term_factors: Vec<ShortTermFactor>,
    pub policy_cost_brackets: Vec<PolicyCostBracket>,
    pub commission_rates: Vec<CommissionRate>,
    pub tax_rates: Vec<ProductTaxRate>,
}

impl RateTables {
    /// Tables with no rows; every lookup falls back to its default
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard CIMA-market tables used at go-live
    pub fn cima_defaults() -> Self {
        let bands = [
            (4, 7, dec!(2.50)),
            (8, 9, dec!(3.00)),
            (10, 11, dec!(3.50)),
            (12, 14, dec!(4.00)),
            (15, 20, dec!(5.00)),
            (21, 999, dec!(6.00)),
        ];
        let rating_factors = [FuelType::Essence, FuelType::Diesel]
            .into_iter()
            .flat_map(|fuel| {
                bands
                    .iter()
                    .map(move |(min, max, rate)| RatingFactor::new(*min, *max, fuel, *rate))
            })
            .collect();

        let short_term_factors = [
            (1, dec!(0.25)),
            (3, dec!(0.40)),
            (6, dec!(0.70)),
            (9, dec!(0.85)),
            (12, dec!(1.00)),
        ]
        .into_iter()
        .map(|(months, coefficient)| ShortTermFactor { months, coefficient })
        .collect();

        let policy_cost_brackets = vec![
            PolicyCostBracket::new("MOTOR", dec!(0), Some(dec!(25000)), dec!(1000)),
            PolicyCostBracket::new("MOTOR", dec!(25001), Some(dec!(50000)), dec!(1500)),
            PolicyCostBracket::new("MOTOR", dec!(50001), Some(dec!(75000)), dec!(2000)),
            PolicyCostBracket::new("MOTOR", dec!(75001), Some(dec!(100000)), dec!(2500)),
            PolicyCostBracket::new("MOTOR", dec!(100001), None, dec!(3000)),
        ];

        let commission_rates = [
            DistributorType::InternalAgent,
            DistributorType::Broker,
            DistributorType::GeneralAgent,
            DistributorType::Bancassurance,
        ]
        .into_iter()
        .map(|distributor_type| CommissionRate {
            distributor_type,
            product_type: ProductType::Motor,
            rate: distributor_type.default_commission_rate(),
        })
        .collect();

        let tax_rates = vec![
            ProductTaxRate::new(ProductType::Motor, "Taxes", dec!(0.145), false),
            ProductTaxRate::new(ProductType::Motor, "Frais de contrôle", dec!(0.0125), true),
            ProductTaxRate::new(ProductType::Fire, "Taxes", dec!(0.25), false),
            ProductTaxRate::new(ProductType::Fire, "Frais de contrôle", dec!(0.0125), true),
            ProductTaxRate::new(ProductType::Liability, "Taxes", dec!(0.145), false),
            ProductTaxRate::new(ProductType::Liability, "Frais de contrôle", dec!(0.0125), true),
        ];

        Self {
            rating_factors,
            short_term_factors,
            policy_cost_brackets,
            commission_rates,
            tax_rates,
        }
    }

    /// First active row containing `horsepower` for `fuel_type`
    pub fn rating_factor(&self, horsepower: u32, fuel_type: FuelType) -> Option<&RatingFactor> {
        self.rating_factors
            .iter()
            .find(|f| f.matches(horsepower, fuel_type))
    }

    pub fn short_term_coefficient(&self, months: u32) -> Option<Decimal> {
        self.short_term_factors
            .iter()
            .find(|f| f.months == months)
            .map(|f| f.coefficient)
    }

    /// Policy cost for the bracket containing `net_premium`
    ///
    /// Brackets are expressed in whole currency units (`0..=25000`,
    /// `25001..=50000`, ...). A fractional premium that falls between two
    /// brackets is placed by its whole-unit part.
    pub fn policy_cost(&self, product_code: &str, net_premium: Decimal) -> Option<Decimal> {
        let lookup = |amount: Decimal| {
            self.policy_cost_brackets
                .iter()
                .find(|b| b.product_code == product_code && b.contains(amount))
                .map(|b| b.cost_amount)
        };
        lookup(net_premium).or_else(|| lookup(net_premium.floor()))
    }

    pub fn commission_rate(
        &self,
        distributor_type: DistributorType,
        product_type: ProductType,
    ) -> Option<Decimal> {
        self.commission_rates
            .iter()
            .find(|r| r.distributor_type == distributor_type && r.product_type == product_type)
            .map(|r| r.rate)
    }

    pub fn tax_rates_for(&self, product_type: ProductType) -> Vec<&ProductTaxRate> {
        self.tax_rates
            .iter()
            .filter(|r| r.product_type == product_type)
            .collect()
    }

    /// Checks structural soundness of the tables
    ///
    /// # Errors
    ///
    /// Returns `RatingError::InvalidRateTable` when:
    /// - a horsepower band is inverted or overlaps another active band of the same fuel type
    /// - a duration appears twice or has a non-positive coefficient
    /// - a policy cost bracket is inverted or overlaps another bracket of the same product
    /// - any rate is negative
    pub fn validate(&self) -> Result<(), RatingError> {
        for (i, factor) in self.rating_factors.iter().enumerate() {
            if factor.horsepower_min > factor.horsepower_max {
                return Err(RatingError::invalid_table(format!(
                    "rating factor {}-{} {} is inverted",
                    factor.horsepower_min, factor.horsepower_max, factor.fuel_type
                )));
            }
            if factor.rate_percentage.is_sign_negative() {
                return Err(RatingError::invalid_table("negative rating factor"));
            }
            let overlaps = self.rating_factors[i + 1..].iter().any(|other| {
                factor.is_active
                    && other.is_active
                    && other.fuel_type == factor.fuel_type
                    && other.horsepower_min <= factor.horsepower_max
                    && factor.horsepower_min <= other.horsepower_max
            });
            if overlaps {
                return Err(RatingError::invalid_table(format!(
                    "rating factor {}-{} {} overlaps another band",
                    factor.horsepower_min, factor.horsepower_max, factor.fuel_type
                )));
            }
        }

        for (i, factor) in self.short_term_factors.iter().enumerate() {
            if factor.coefficient <= Decimal::ZERO {
                return Err(RatingError::invalid_table(format!(
                    "short-term coefficient for {} months must be positive",
                    factor.months
                )));
            }
            if self.short_term_factors[i + 1..].iter().any(|o| o.months == factor.months) {
                return Err(RatingError::invalid_table(format!(
                    "duplicate short-term factor for {} months",
                    factor.months
                )));
            }
        }

        for (i, bracket) in self.policy_cost_brackets.iter().enumerate() {
            if bracket.net_premium_max.is_some_and(|max| max < bracket.net_premium_min) {
                return Err(RatingError::invalid_table(format!(
                    "policy cost bracket starting at {} is inverted",
                    bracket.net_premium_min
                )));
            }
            let overlaps = self.policy_cost_brackets[i + 1..].iter().any(|other| {
                other.product_code == bracket.product_code
                    && other.net_premium_max.map_or(true, |max| bracket.net_premium_min <= max)
                    && bracket.net_premium_max.map_or(true, |max| other.net_premium_min <= max)
            });
            if overlaps {
                return Err(RatingError::invalid_table(format!(
                    "policy cost bracket starting at {} overlaps another bracket",
                    bracket.net_premium_min
                )));
            }
        }

        let negative_rate = self.commission_rates.iter().any(|r| r.rate.is_sign_negative())
            || self.tax_rates.iter().any(|r| r.rate.is_sign_negative());
        if negative_rate {
            return Err(RatingError::invalid_table("negative commission or tax rate"));
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}
