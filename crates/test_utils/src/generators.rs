//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating rating inputs that stay
//! inside the domain's accepted ranges.

use core_kernel::{Currency, Money};
use domain_rating::{DistributorType, FuelType, RatingRequest};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for fuel types, including those without a rating band
pub fn fuel_type_strategy() -> impl Strategy<Value = FuelType> {
    prop_oneof![
        Just(FuelType::Essence),
        Just(FuelType::Diesel),
        Just(FuelType::Hybrid),
        Just(FuelType::Electric),
    ]
}

pub fn distributor_type_strategy() -> impl Strategy<Value = DistributorType> {
    prop_oneof![
        Just(DistributorType::InternalAgent),
        Just(DistributorType::GeneralAgent),
        Just(DistributorType::Broker),
        Just(DistributorType::Bancassurance),
    ]
}

/// Fiscal horsepower, beyond the highest band
pub fn horsepower_strategy() -> impl Strategy<Value = u32> {
    1u32..40u32
}

/// Durations, including ones without a short-term coefficient
pub fn duration_months_strategy() -> impl Strategy<Value = u32> {
    1u32..=24u32
}

/// Vehicle values between 100,000 and 100,000,000 XOF
pub fn vehicle_value_strategy() -> impl Strategy<Value = Money> {
    (100_000i64..100_000_000i64).prop_map(|amount| Money::new(Decimal::new(amount, 0), Currency::XOF))
}

/// A (professional, commercial) discount pair summing to at most 100%
pub fn discount_pair_strategy() -> impl Strategy<Value = (Decimal, Decimal)> {
    (0u32..=10000u32)
        .prop_flat_map(|professional| (Just(professional), 0u32..=(10000 - professional)))
        .prop_map(|(p, c)| (Decimal::new(p as i64, 2), Decimal::new(c as i64, 2)))
}

/// Complete valid rating requests without coverages
pub fn rating_request_strategy() -> impl Strategy<Value = RatingRequest> {
    (
        vehicle_value_strategy(),
        horsepower_strategy(),
        fuel_type_strategy(),
        duration_months_strategy(),
        discount_pair_strategy(),
        proptest::option::of(distributor_type_strategy()),
    )
        .prop_map(|(value, horsepower, fuel, months, (professional, commercial), distributor)| {
            let request = RatingRequest::new(value, horsepower, fuel, months)
                .with_discounts(professional, commercial);
            match distributor {
                Some(d) => request.with_distributor(d),
                None => request,
            }
        })
}
