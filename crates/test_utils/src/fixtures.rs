//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data shared across the crates' test suites.
//! Dates and amounts are fixed so results are predictable.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Currency, Money, VehicleCategoryId, VehicleMakeId, VehicleModelId};
use domain_policy::VehicleDetails;
use domain_rating::{FuelType, RatingRequest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// West African CFA franc amount
    pub fn xof(amount: Decimal) -> Money {
        Money::new(amount, Currency::XOF)
    }

    /// Vehicle value used by the reference rating scenarios
    pub fn vehicle_value() -> Money {
        Self::xof(dec!(5000000))
    }

    pub fn xof_zero() -> Money {
        Money::zero(Currency::XOF)
    }

    /// For currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Instant the test clock starts at
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
    }

    pub fn policy_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    /// One year of cover from `policy_start`
    pub fn policy_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    /// A loss date inside the default coverage period
    pub fn loss_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 18).unwrap()
    }

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }
}

/// Fixture for vehicles and rating inputs
pub struct VehicleFixtures;

impl VehicleFixtures {
    /// 9 CV petrol saloon worth 5,000,000 XOF
    pub fn saloon(category_id: VehicleCategoryId, make_id: VehicleMakeId, model_id: VehicleModelId) -> VehicleDetails {
        VehicleDetails {
            category_id,
            make_id,
            model_id,
            registration_number: "1234 AB 01".to_string(),
            chassis_number: "VF1RFB00X12345678".to_string(),
            year_of_manufacture: 2021,
            horsepower: 9,
            fuel_type: FuelType::Essence,
            vehicle_value: MoneyFixtures::vehicle_value(),
        }
    }

    /// Rating request of the 12-month reference scenario (total 174,750 XOF)
    pub fn annual_rating_request() -> RatingRequest {
        RatingRequest::new(MoneyFixtures::vehicle_value(), 9, FuelType::Essence, 12)
    }

    /// Same vehicle over a 3-month term (total 70,700 XOF)
    pub fn quarterly_rating_request() -> RatingRequest {
        RatingRequest::new(MoneyFixtures::vehicle_value(), 9, FuelType::Essence, 3)
    }
}
