//! Premium taxes
//!
//! Configured `ProductTaxRate` rows win; a product with no rows uses the CIMA
//! defaults below. The rating engine reads its tax rate from here as well, so
//! the 14.5% motor rate has a single source.

use once_cell::sync::Lazy;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, Rate};

use crate::error::RatingError;
use crate::reference::ProductType;
use crate::tables::{ProductTaxRate, RateTables};

static CIMA_DEFAULT_TAX_RATES: Lazy<Vec<ProductTaxRate>> = Lazy::new(|| {
    [
        (ProductType::Motor, dec!(0.145)),
        (ProductType::Fire, dec!(0.25)),
        (ProductType::Liability, dec!(0.145)),
        (ProductType::Transport, dec!(0.145)),
        (ProductType::Health, dec!(0.145)),
    ]
    .into_iter()
    .flat_map(|(product_type, tax)| {
        [
            ProductTaxRate::new(product_type, "Taxes", tax, false),
            ProductTaxRate::new(product_type, "Frais de contrôle", dec!(0.0125), true),
        ]
    })
    .collect()
});

/// One computed tax or fee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxLine {
    pub name: String,
    pub rate: Rate,
    pub amount: Money,
    pub is_fee: bool,
}

/// Result of a tax calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub product_type: ProductType,
    pub net_premium: Money,
    pub lines: Vec<TaxLine>,
    pub total_tax: Money,
    /// Net premium plus every tax and fee
    pub gross_premium: Money,
}

/// Computes taxes and fees on a net premium
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    tables: &'a RateTables,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(tables: &'a RateTables) -> Self {
        Self { tables }
    }

    /// Configured rows for the product, or the CIMA defaults when there are none
    pub fn rates_for(&self, product_type: ProductType) -> Vec<&'a ProductTaxRate> {
        let configured = self.tables.tax_rates_for(product_type);
        if !configured.is_empty() {
            return configured;
        }
        CIMA_DEFAULT_TAX_RATES
            .iter()
            .filter(|r| r.product_type == product_type)
            .collect()
    }

    /// The premium tax proper (first non-fee row), excluding control fees
    pub fn principal_tax_rate(&self, product_type: ProductType) -> Rate {
        self.rates_for(product_type)
            .into_iter()
            .find(|r| !r.is_fee)
            .map(|r| Rate::new(r.rate))
            .unwrap_or_else(|| Rate::new(dec!(0.145)))
    }

    /// Computes every tax line for `net_premium`
    ///
    /// # Errors
    ///
    /// Returns an error only if the line amounts cannot be summed, which
    /// cannot happen for a single-currency input.
    pub fn calculate(
        &self,
        product_type: ProductType,
        net_premium: Money,
    ) -> Result<TaxBreakdown, RatingError> {
        let lines: Vec<TaxLine> = self
            .rates_for(product_type)
            .into_iter()
            .map(|r| TaxLine {
                name: r.tax_name.clone(),
                rate: Rate::new(r.rate),
                amount: net_premium.multiply(r.rate),
                is_fee: r.is_fee,
            })
            .collect();

        let total_tax = Money::sum(net_premium.currency(), lines.iter().map(|l| &l.amount))?;
        let gross_premium = net_premium.checked_add(&total_tax)?;

        Ok(TaxBreakdown {
            product_type,
            net_premium,
            lines,
            total_tax,
            gross_premium,
        })
    }
}
