//! Property-based tests for tax calculation.

#![allow(clippy::float_arithmetic)]

use chrono::NaiveDate;
use proptest::prelude::*;
use tally_shared::types::MinorUnits;

use crate::treasury::tax_rate::TaxRate;
use crate::treasury::types::{BracketType, NewTaxRate, TaxType};

fn rate(bracket_type: BracketType, rate: f64, min: MinorUnits, max: Option<MinorUnits>) -> TaxRate {
    TaxRate::new(NewTaxRate {
        tax_type: TaxType::Income,
        name: "prop".into(),
        description: String::new(),
        rate,
        bracket_type,
        min_amount: Some(min),
        max_amount: max,
        category: None,
        jurisdiction_code: "XX".into(),
        effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        expiration_date: None,
    })
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// A progressive band never taxes more than its own width, and never
    /// taxes amounts below its floor.
    #[test]
    fn prop_progressive_bounded_by_band(
        pct in 0u32..=100,
        min in 0i64..100_000,
        width in 1i64..100_000,
        amount in 0i64..500_000,
    ) {
        let max = min + width;
        let band = rate(BracketType::Progressive, f64::from(pct) / 100.0, min, Some(max));
        let full = band.calculate_tax(max);

        let tax = band.calculate_tax(amount);
        prop_assert!(tax >= 0);
        prop_assert!(tax <= full);
        prop_assert!(full <= width);
        if amount < min {
            prop_assert_eq!(tax, 0);
        }
    }

    /// Progressive and flat tax never decrease as the amount grows.
    #[test]
    fn prop_progressive_and_flat_monotonic(
        pct in 0u32..=100,
        min in 0i64..50_000,
        a in 0i64..200_000,
        b in 0i64..200_000,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let r = f64::from(pct) / 100.0;
        for bracket in [
            rate(BracketType::Progressive, r, min, None),
            rate(BracketType::Flat, r, 0, None),
        ] {
            prop_assert!(bracket.calculate_tax(low) <= bracket.calculate_tax(high));
        }
    }

    /// Flat tax is never larger than the taxed amount.
    #[test]
    fn prop_flat_within_amount(pct in 0u32..=100, amount in 0i64..10_000_000) {
        let flat = rate(BracketType::Flat, f64::from(pct) / 100.0, 0, None);
        let tax = flat.calculate_tax(amount);
        prop_assert!((0..=amount).contains(&tax));
    }
}
