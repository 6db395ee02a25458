//! Property-based tests for treasury reports.

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::{MinorUnits, TaxpayerId};

use super::builder::{TOP_TAXPAYERS, TaxReports};
use crate::treasury::payment::TaxPayment;
use crate::treasury::types::{NewTaxPayment, PaymentMethod, TaxType};

fn arb_payment(payers: Vec<TaxpayerId>) -> impl Strategy<Value = TaxPayment> {
    (
        prop::sample::select(payers),
        prop::sample::select(TaxType::ALL.to_vec()),
        1i64..1_000_000i64,
        1u32..=28,
        1u32..=12,
        any::<bool>(),
    )
        .prop_map(|(taxpayer_id, tax_type, amount, day, month, completed)| {
            let mut payment = TaxPayment::new(NewTaxPayment {
                taxpayer_id,
                filing_id: None,
                tax_type,
                amount,
                payment_method: PaymentMethod::Electronic,
                payment_date: NaiveDate::from_ymd_opt(2024, month, day).unwrap(),
                notes: String::new(),
            })
            .unwrap();
            if completed {
                payment.mark_completed().unwrap();
            }
            payment
        })
}

fn arb_payments() -> impl Strategy<Value = Vec<TaxPayment>> {
    let payers: Vec<TaxpayerId> = (0..15).map(|_| TaxpayerId::new()).collect();
    prop::collection::vec(arb_payment(payers), 0..60)
}

fn year() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Total revenue equals both the per-type and the per-month sums, and
    /// equals the sum of completed payments.
    #[test]
    fn prop_revenue_totals_agree(payments in arb_payments()) {
        let (start, end) = year();
        let report = TaxReports::revenue(&payments, &HashMap::new(), start, end);

        let completed: MinorUnits = payments
            .iter()
            .filter(|p| p.is_completed())
            .map(|p| p.amount)
            .sum();
        let by_type: MinorUnits = report.revenue_by_type.values().sum();
        let by_month: MinorUnits = report.monthly_revenue.iter().map(|m| m.revenue).sum();

        prop_assert_eq!(report.total_revenue, completed);
        prop_assert_eq!(by_type, completed);
        prop_assert_eq!(by_month, completed);
        prop_assert_eq!(report.revenue_by_type.len(), TaxType::ALL.len());
    }

    /// Top taxpayers are capped and ordered by revenue, highest first.
    #[test]
    fn prop_top_taxpayers_ordered(payments in arb_payments()) {
        let (start, end) = year();
        let report = TaxReports::revenue(&payments, &HashMap::new(), start, end);

        prop_assert!(report.top_taxpayers.len() <= TOP_TAXPAYERS);
        for pair in report.top_taxpayers.windows(2) {
            prop_assert!(pair[0].revenue >= pair[1].revenue);
        }
    }

    /// Breakdown percentages add up to 100 within rounding, or are all zero
    /// when there is no revenue.
    #[test]
    fn prop_breakdown_percentages_sum_to_hundred(payments in arb_payments()) {
        let (start, end) = year();
        let report = TaxReports::tax_type_breakdown(&payments, &[], start, end);

        let sum: Decimal = report.breakdown_by_type.values().map(|b| b.percentage).sum();
        if report.total_revenue == 0 {
            prop_assert_eq!(sum, Decimal::ZERO);
        } else {
            prop_assert!((sum - dec!(100)).abs() <= dec!(0.05), "sum was {}", sum);
        }
    }
}
