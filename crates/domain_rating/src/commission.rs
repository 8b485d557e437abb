//! Distributor commission
//!
//! Rates are fractions (`0.10` is 10%) and are applied directly to the
//! commissionable amount.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, Rate};

use crate::error::RatingError;
use crate::reference::{DistributorType, ProductType};
use crate::tables::RateTables;

/// Withholding on commissions of agents acting under a mandate
pub const MANDATE_TAX_RATE: Decimal = dec!(0.075);

/// Result of a commission calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub distributor_type: DistributorType,
    pub product_type: ProductType,
    pub net_premium: Money,
    /// Portion of net premium excluded from commission
    pub life_premium: Money,
    pub commissionable_amount: Money,
    pub rate: Rate,
    pub commission_amount: Money,
    pub has_mandate_tax: bool,
    pub mandate_tax_rate: Rate,
    pub mandate_tax_amount: Money,
    /// Commission after mandate tax
    pub net_commission: Money,
}

/// Computes distributor commission from the rate tables
#[derive(Debug, Clone, Copy)]
pub struct CommissionCalculator<'a> {
    tables: &'a RateTables,
}

impl<'a> CommissionCalculator<'a> {
    pub fn new(tables: &'a RateTables) -> Self {
        Self { tables }
    }

    /// Table rate for (distributor type, product), else the per-type default
    pub fn rate_for(&self, distributor_type: DistributorType, product_type: ProductType) -> Rate {
        let rate = self
            .tables
            .commission_rate(distributor_type, product_type)
            .unwrap_or_else(|| distributor_type.default_commission_rate());
        Rate::new(rate)
    }

    /// Computes the commission due on `net_premium`
    ///
    /// # Arguments
    ///
    /// * `life_premium` - sub-premium excluded from the commissionable base, if any
    ///
    /// # Errors
    ///
    /// Returns an error if `life_premium` is in another currency, or if it is
    /// negative or larger than the net premium.
    pub fn calculate(
        &self,
        distributor_type: DistributorType,
        product_type: ProductType,
        net_premium: Money,
        life_premium: Option<Money>,
    ) -> Result<CommissionBreakdown, RatingError> {
        let currency = net_premium.currency();
        let life_premium = life_premium.unwrap_or_else(|| Money::zero(currency));
        if life_premium.is_negative() || life_premium.amount() > net_premium.amount() {
            return Err(RatingError::invalid_input(
                "life premium must lie between zero and the net premium",
            ));
        }

        let commissionable_amount = net_premium.checked_sub(&life_premium)?;
        let rate = self.rate_for(distributor_type, product_type);
        let commission_amount = rate.apply(&commissionable_amount);

        let has_mandate_tax = distributor_type.has_mandate_tax();
        let mandate_tax_rate = Rate::new(MANDATE_TAX_RATE);
        let mandate_tax_amount = if has_mandate_tax {
            mandate_tax_rate.apply(&commission_amount)
        } else {
            Money::zero(currency)
        };
        let net_commission = commission_amount.checked_sub(&mandate_tax_amount)?;

        Ok(CommissionBreakdown {
            distributor_type,
            product_type,
            net_premium,
            life_premium,
            commissionable_amount,
            rate,
            commission_amount,
            has_mandate_tax,
            mandate_tax_rate,
            mandate_tax_amount,
            net_commission,
        })
    }
}
