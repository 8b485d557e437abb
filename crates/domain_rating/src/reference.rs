//! Reference vocabulary shared by rating, quoting and policy administration

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{CoverageId, DistributorId};

/// Fuel type of the insured vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Essence,
    Diesel,
    Hybrid,
    Electric,
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Distribution channel of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistributorType {
    /// Salaried agent
    InternalAgent,
    GeneralAgent,
    Broker,
    Bancassurance,
}

impl DistributorType {
    /// Commission rate applied when no table row exists
    pub fn default_commission_rate(&self) -> Decimal {
        match self {
            DistributorType::InternalAgent => Decimal::new(10, 2),
            DistributorType::Broker => Decimal::new(125, 3),
            DistributorType::GeneralAgent => Decimal::new(15, 2),
            DistributorType::Bancassurance => Decimal::new(8, 2),
        }
    }

    /// Agents acting under a mandate have a withholding on their commission
    pub fn has_mandate_tax(&self) -> bool {
        matches!(self, DistributorType::InternalAgent | DistributorType::GeneralAgent)
    }
}

/// Line of business, used to key tax and commission tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    Motor,
    Fire,
    Liability,
    Transport,
    Health,
}

impl ProductType {
    pub fn label(&self) -> &'static str {
        match self {
            ProductType::Motor => "Automobile",
            ProductType::Fire => "Incendie",
            ProductType::Liability => "Responsabilité Civile",
            ProductType::Transport => "Transport",
            ProductType::Health => "Santé",
        }
    }
}

/// An entry of the coverage catalogue (a lettered "section")
///
/// Coverage premiums are flat amounts; they are not rated on vehicle value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorCoverage {
    pub id: CoverageId,
    /// e.g. `SECTION_A`
    pub code: String,
    pub name: String,
    pub section_letter: char,
    pub fixed_premium: Decimal,
    pub is_mandatory: bool,
    pub is_active: bool,
}

impl MotorCoverage {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        section_letter: char,
        fixed_premium: Decimal,
    ) -> Self {
        Self {
            id: CoverageId::new_v7(),
            code: code.into(),
            name: name.into(),
            section_letter,
            fixed_premium,
            is_mandatory: false,
            is_active: true,
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.is_mandatory = true;
        self
    }

    /// The standard SECTION_A..SECTION_H catalogue
    pub fn standard_catalogue() -> Vec<MotorCoverage> {
        vec![
            MotorCoverage::new("SECTION_A", "Responsabilité Civile", 'A', Decimal::ZERO).mandatory(),
            MotorCoverage::new("SECTION_B", "Défense et Recours", 'B', Decimal::new(5000, 0)),
            MotorCoverage::new("SECTION_C", "Incendie", 'C', Decimal::ZERO),
            MotorCoverage::new("SECTION_D", "Vol", 'D', Decimal::ZERO),
            MotorCoverage::new("SECTION_E", "Bris de Glace", 'E', Decimal::new(5000, 0)),
            MotorCoverage::new("SECTION_F", "Dommages Collision", 'F', Decimal::ZERO),
            MotorCoverage::new("SECTION_G", "Catastrophes Naturelles", 'G', Decimal::new(3000, 0)),
            MotorCoverage::new("SECTION_H", "Individuelle Conducteur", 'H', Decimal::new(8000, 0)),
        ]
    }
}

/// Intermediary through which a quote was sold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distributor {
    pub id: DistributorId,
    pub code: String,
    pub name: String,
    pub distributor_type: DistributorType,
    pub is_active: bool,
}

impl Distributor {
    pub fn new(code: impl Into<String>, name: impl Into<String>, distributor_type: DistributorType) -> Self {
        Self {
            id: DistributorId::new_v7(),
            code: code.into(),
            name: name.into(),
            distributor_type,
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_commission_rates_are_fractions() {
        assert_eq!(DistributorType::InternalAgent.default_commission_rate(), dec!(0.10));
        assert_eq!(DistributorType::Broker.default_commission_rate(), dec!(0.125));
        assert_eq!(DistributorType::GeneralAgent.default_commission_rate(), dec!(0.15));
        assert_eq!(DistributorType::Bancassurance.default_commission_rate(), dec!(0.08));
    }

    #[test]
    fn test_standard_catalogue() {
        let catalogue = MotorCoverage::standard_catalogue();
        assert_eq!(catalogue.len(), 8);
        assert!(catalogue[0].is_mandatory);
        let total: Decimal = catalogue.iter().map(|c| c.fixed_premium).sum();
        assert_eq!(total, dec!(21000));
    }
}
