//! Integration tests for domain_rating - engine scenarios, table validation and rating identities

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use core_kernel::{Currency, Money};
use domain_rating::{
    DistributorType, FuelType, MotorCoverage, PolicyCostBracket, RateTables, RatingEngine,
    RatingError, RatingFactor, RatingRequest, RatingSettings, ShortTermFactor,
};

fn xof(amount: Decimal) -> Money {
    Money::new(amount, Currency::XOF)
}

// ============= ENGINE SCENARIOS =============
mod engine_tests {
    use super::*;

    #[test]
    fn test_quarterly_contract_uses_short_term_coefficient() {
        let engine = RatingEngine::with_defaults();
        let breakdown = engine
            .calculate(&RatingRequest::new(xof(dec!(5000000)), 9, FuelType::Essence, 3))
            .unwrap();

        assert_eq!(breakdown.base_premium.amount(), dec!(150000));
        assert_eq!(breakdown.short_term_coefficient, dec!(0.40));
        assert_eq!(breakdown.net_premium.amount(), dec!(60000));
        assert_eq!(breakdown.tax_amount.amount(), dec!(8700));
        assert_eq!(breakdown.policy_cost_amount.amount(), dec!(2000));
        assert_eq!(breakdown.total_premium.amount(), dec!(70700));
    }

    #[test]
    fn test_unlisted_duration_falls_back_to_annual_coefficient() {
        let engine = RatingEngine::with_defaults();
        let breakdown = engine
            .calculate(&RatingRequest::new(xof(dec!(1000000)), 5, FuelType::Diesel, 7))
            .unwrap();

        assert_eq!(breakdown.short_term_coefficient, dec!(1.0));
        assert_eq!(breakdown.net_premium.amount(), dec!(25000));
        assert_eq!(breakdown.policy_cost_amount.amount(), dec!(1000));
    }

    #[test]
    fn test_hybrid_has_no_band_and_uses_default_factor() {
        let engine = RatingEngine::with_defaults();
        let breakdown = engine
            .calculate(&RatingRequest::new(xof(dec!(4000000)), 12, FuelType::Hybrid, 12))
            .unwrap();

        assert_eq!(breakdown.rating_factor, dec!(2.50));
        assert_eq!(breakdown.base_premium.amount(), dec!(100000));
        assert_eq!(breakdown.policy_cost_amount.amount(), dec!(2500));
    }

    #[test]
    fn test_full_catalogue_adds_flat_sections() {
        let engine = RatingEngine::with_defaults();
        let request = RatingRequest::new(xof(dec!(1000000)), 4, FuelType::Essence, 12)
            .with_coverages(MotorCoverage::standard_catalogue());

        let breakdown = engine.calculate(&request).unwrap();

        assert_eq!(breakdown.coverages.len(), 8);
        assert_eq!(breakdown.sections_premium.amount(), dec!(21000));
        assert_eq!(breakdown.subtotal.amount(), dec!(46000));
        assert_eq!(breakdown.policy_cost_amount.amount(), dec!(1500));
    }

    #[test]
    fn test_full_discount_leaves_zero_net() {
        let engine = RatingEngine::with_defaults();
        let request = RatingRequest::new(xof(dec!(1000000)), 9, FuelType::Essence, 12)
            .with_discounts(dec!(50), dec!(50));

        let breakdown = engine.calculate(&request).unwrap();

        assert!(breakdown.net_premium.is_zero());
        assert!(breakdown.tax_amount.is_zero());
        assert_eq!(breakdown.total_premium.amount(), dec!(1000));
    }

    #[test]
    fn test_custom_settings_apply_when_tables_are_empty() {
        let settings = RatingSettings {
            default_rating_factor: dec!(4.00),
            default_short_term_coefficient: dec!(0.50),
            default_policy_cost: dec!(750),
            policy_cost_product_code: "MOTOR".to_string(),
        };
        let engine = RatingEngine::new(Arc::new(RateTables::empty()), settings);

        let breakdown = engine
            .calculate(&RatingRequest::new(xof(dec!(1000000)), 9, FuelType::Essence, 6))
            .unwrap();

        assert_eq!(breakdown.base_premium.amount(), dec!(40000));
        assert_eq!(breakdown.net_premium.amount(), dec!(20000));
        assert_eq!(breakdown.policy_cost_amount.amount(), dec!(750));
    }

    #[test]
    fn test_bancassurance_commission() {
        let engine = RatingEngine::with_defaults();
        let request = RatingRequest::new(xof(dec!(5000000)), 9, FuelType::Essence, 12)
            .with_distributor(DistributorType::Bancassurance);

        let breakdown = engine.calculate(&request).unwrap();

        assert_eq!(breakdown.commission_amount.unwrap().amount(), dec!(12000));
    }

    #[test]
    fn test_negative_discount_is_rejected() {
        let engine = RatingEngine::with_defaults();
        let request = RatingRequest::new(xof(dec!(1000000)), 9, FuelType::Essence, 12)
            .with_discounts(dec!(-1), dec!(0));

        let error = engine.calculate(&request).unwrap_err();
        assert!(matches!(error, RatingError::InvalidInput(_)));
        assert_eq!(error.kind().to_string(), "validation");
    }

    #[test]
    fn test_breakdown_serializes() {
        let engine = RatingEngine::with_defaults();
        let breakdown = engine
            .calculate(&RatingRequest::new(xof(dec!(5000000)), 9, FuelType::Essence, 12))
            .unwrap();

        let json = serde_json::to_value(&breakdown).unwrap();
        assert!(json.get("net_premium").is_some());
        assert!(json.get("policy_cost_amount").is_some());
    }
}

// ============= TABLE VALIDATION =============
mod table_tests {
    use super::*;

    #[test]
    fn test_seeded_tables_are_valid() {
        assert!(RateTables::cima_defaults().validate().is_ok());
    }

    #[test]
    fn test_overlapping_bands_are_rejected() {
        let mut tables = RateTables::empty();
        tables.rating_factors.push(RatingFactor::new(1, 9, FuelType::Essence, dec!(2.00)));
        tables.rating_factors.push(RatingFactor::new(9, 12, FuelType::Essence, dec!(3.00)));

        assert!(matches!(tables.validate(), Err(RatingError::InvalidRateTable(_))));
    }

    #[test]
    fn test_same_band_for_different_fuels_is_allowed() {
        let mut tables = RateTables::empty();
        tables.rating_factors.push(RatingFactor::new(1, 9, FuelType::Essence, dec!(2.00)));
        tables.rating_factors.push(RatingFactor::new(1, 9, FuelType::Diesel, dec!(2.00)));

        assert!(tables.validate().is_ok());
    }

    #[test]
    fn test_duplicate_duration_is_rejected() {
        let mut tables = RateTables::empty();
        tables.short_term_factors.push(ShortTermFactor { months: 3, coefficient: dec!(0.40) });
        tables.short_term_factors.push(ShortTermFactor { months: 3, coefficient: dec!(0.45) });

        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_inverted_cost_bracket_is_rejected() {
        let mut tables = RateTables::empty();
        tables
            .policy_cost_brackets
            .push(PolicyCostBracket::new("MOTOR", dec!(5000), Some(dec!(100)), dec!(1000)));

        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_fractional_premium_between_brackets_uses_whole_part() {
        let tables = RateTables::cima_defaults();
        assert_eq!(tables.policy_cost("MOTOR", dec!(25000.5)), Some(dec!(1000)));
        assert_eq!(tables.policy_cost("MOTOR", dec!(25001)), Some(dec!(1500)));
        assert_eq!(tables.policy_cost("HOME", dec!(25001)), None);
    }

    #[test]
    fn test_tables_deserialize_with_missing_sections() {
        let tables: RateTables = serde_json::from_str(
            r#"{"short_term_factors": [{"months": 6, "coefficient": "0.70"}]}"#,
        )
        .unwrap();

        assert!(tables.rating_factors.is_empty());
        assert_eq!(tables.short_term_coefficient(6), Some(dec!(0.70)));
    }
}

// ============= PROPERTY TESTS =============
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn fuel() -> impl Strategy<Value = FuelType> {
        prop_oneof![
            Just(FuelType::Essence),
            Just(FuelType::Diesel),
            Just(FuelType::Hybrid),
            Just(FuelType::Electric),
        ]
    }

    proptest! {
        #[test]
        fn totals_are_consistent(
            value in 100_000i64..100_000_000i64,
            horsepower in 1u32..40,
            fuel_type in fuel(),
            months in 1u32..=12,
            professional in 0u32..=50,
            commercial in 0u32..=50,
        ) {
            let engine = RatingEngine::with_defaults();
            let request = RatingRequest::new(xof(Decimal::from(value)), horsepower, fuel_type, months)
                .with_coverages(MotorCoverage::standard_catalogue())
                .with_discounts(Decimal::from(professional), Decimal::from(commercial));

            let b = engine.calculate(&request).unwrap();

            prop_assert_eq!(b.subtotal, b.base_premium + b.sections_premium);
            prop_assert_eq!(b.net_premium_before_short_term, b.subtotal - b.total_discount);
            prop_assert_eq!(b.total_premium, b.net_premium + b.tax_amount + b.policy_cost_amount);
            prop_assert!(!b.net_premium.is_negative());
            prop_assert!(b.net_premium.amount() <= b.net_premium_before_short_term.amount());
        }

        #[test]
        fn base_premium_grows_with_vehicle_value(
            value in 100_000i64..50_000_000i64,
            extra in 1i64..10_000_000i64,
            horsepower in 1u32..40,
        ) {
            let engine = RatingEngine::with_defaults();
            let low = engine
                .calculate(&RatingRequest::new(xof(Decimal::from(value)), horsepower, FuelType::Diesel, 12))
                .unwrap();
            let high = engine
                .calculate(&RatingRequest::new(xof(Decimal::from(value + extra)), horsepower, FuelType::Diesel, 12))
                .unwrap();

            prop_assert!(high.base_premium.amount() > low.base_premium.amount());
            prop_assert!(high.policy_cost_amount.amount() >= low.policy_cost_amount.amount());
        }
    }
}
