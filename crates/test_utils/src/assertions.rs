//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::{ErrorKind, Money};
use domain_rating::PremiumBreakdown;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value carries exactly `amount`
pub fn assert_amount(money: &Money, amount: Decimal) {
    assert_eq!(
        money.amount(),
        amount,
        "Expected {} {}, got {} {}",
        amount,
        money.currency(),
        money.amount(),
        money.currency()
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts the arithmetic identities every breakdown must satisfy
///
/// Amounts are stored with four decimals, so the short-term product is
/// compared with that tolerance.
///
/// # Panics
///
/// Panics naming the first identity that does not hold
pub fn assert_breakdown_consistent(breakdown: &PremiumBreakdown) {
    let sections: Decimal = breakdown.coverages.iter().map(|c| c.premium_amount.amount()).sum();
    assert_eq!(
        breakdown.sections_premium.amount(),
        sections,
        "sections premium is not the sum of coverage premiums"
    );
    assert_eq!(
        breakdown.subtotal.amount(),
        breakdown.base_premium.amount() + breakdown.sections_premium.amount(),
        "subtotal != base + sections"
    );
    assert_eq!(
        breakdown.net_premium_before_short_term.amount(),
        breakdown.subtotal.amount() - breakdown.total_discount.amount(),
        "net before short term != subtotal - discount"
    );
    let expected_net = breakdown.net_premium_before_short_term.amount() * breakdown.short_term_coefficient;
    assert!(
        (breakdown.net_premium.amount() - expected_net).abs() <= dec!(0.0001),
        "net premium {} != {} x {}",
        breakdown.net_premium.amount(),
        breakdown.net_premium_before_short_term.amount(),
        breakdown.short_term_coefficient
    );
    assert_eq!(
        breakdown.total_premium.amount(),
        breakdown.net_premium.amount() + breakdown.tax_amount.amount() + breakdown.policy_cost_amount.amount(),
        "total != net + tax + policy cost"
    );
    assert!(
        !breakdown.total_premium.is_negative(),
        "total premium is negative: {}",
        breakdown.total_premium
    );
}

/// Asserts the failure category of a domain error
pub fn assert_error_kind(actual: ErrorKind, expected: ErrorKind) {
    assert_eq!(actual, expected, "Expected a {} failure, got {}", expected, actual);
}
