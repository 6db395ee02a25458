//! Report builders over already loaded records.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use tally_shared::types::{MinorUnits, TaxpayerId};

use super::types::{
    FilingStatusReport, MonthlyRevenue, RevenueReport, TaxBreakdown, TaxTypeBreakdownReport,
    TaxpayerComplianceReport, TaxpayerRevenue,
};
use crate::treasury::filing::TaxFiling;
use crate::treasury::payment::TaxPayment;
use crate::treasury::taxpayer::Taxpayer;
use crate::treasury::types::{TaxType, TaxpayerStatus};

/// Number of contributors listed in a revenue report.
pub const TOP_TAXPAYERS: usize = 10;

/// Pure report builders.
pub struct TaxReports;

impl TaxReports {
    /// Builds a revenue report from the completed payments among `payments`
    /// whose value date lies in `start..=end`. `names` resolves taxpayer ids
    /// to display names.
    #[must_use]
    pub fn revenue(
        payments: &[TaxPayment],
        names: &HashMap<TaxpayerId, String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RevenueReport {
        let counted: Vec<&TaxPayment> = completed_in(payments, start, end).collect();

        let mut revenue_by_type = zeroed_by_type();
        let mut monthly: BTreeMap<(i32, u32), MinorUnits> = BTreeMap::new();
        let mut by_taxpayer: HashMap<TaxpayerId, MinorUnits> = HashMap::new();
        for payment in &counted {
            add(revenue_by_type.entry(payment.tax_type).or_default(), payment.amount);
            let month = (payment.payment_date.year(), payment.payment_date.month());
            add(monthly.entry(month).or_default(), payment.amount);
            add(by_taxpayer.entry(payment.taxpayer_id).or_default(), payment.amount);
        }

        let mut top_taxpayers: Vec<TaxpayerRevenue> = by_taxpayer
            .into_iter()
            .map(|(taxpayer_id, revenue)| TaxpayerRevenue {
                taxpayer_id,
                taxpayer_name: names.get(&taxpayer_id).cloned().unwrap_or_default(),
                revenue,
            })
            .collect();
        top_taxpayers.sort_by(|a, b| {
            b.revenue
                .cmp(&a.revenue)
                .then_with(|| a.taxpayer_id.cmp(&b.taxpayer_id))
        });
        top_taxpayers.truncate(TOP_TAXPAYERS);

        RevenueReport {
            start_date: start,
            end_date: end,
            total_revenue: total(revenue_by_type.values().copied()),
            revenue_by_type,
            monthly_revenue: monthly
                .into_iter()
                .map(|((year, month), revenue)| MonthlyRevenue {
                    year,
                    month,
                    revenue,
                })
                .collect(),
            top_taxpayers,
            generated_at: Utc::now(),
        }
    }

    /// Builds a filing status report for `tax_year`, judging overdue at `now`.
    #[must_use]
    pub fn filing_status(
        filings: &[TaxFiling],
        tax_year: i32,
        now: DateTime<Utc>,
    ) -> FilingStatusReport {
        let mut report = FilingStatusReport {
            tax_year,
            total_filings: 0,
            filings_by_status: BTreeMap::new(),
            filings_by_type: BTreeMap::new(),
            overdue_filings: 0,
            generated_at: now,
        };

        for filing in filings.iter().filter(|f| f.tax_year == tax_year) {
            report.total_filings += 1;
            *report.filings_by_status.entry(filing.status).or_default() += 1;
            *report.filings_by_type.entry(filing.filing_type).or_default() += 1;
            if filing.is_overdue_at(now) {
                report.overdue_filings += 1;
            }
        }
        report
    }

    /// Builds a compliance report. A taxpayer is compliant unless delinquent.
    #[must_use]
    pub fn compliance(taxpayers: &[Taxpayer]) -> TaxpayerComplianceReport {
        let mut per_type: BTreeMap<_, (usize, usize)> = BTreeMap::new();
        let mut delinquent = 0;
        for taxpayer in taxpayers {
            let (total, compliant) = per_type.entry(taxpayer.taxpayer_type).or_default();
            *total += 1;
            if taxpayer.status == TaxpayerStatus::Delinquent {
                delinquent += 1;
            } else {
                *compliant += 1;
            }
        }

        TaxpayerComplianceReport {
            total_taxpayers: taxpayers.len(),
            compliant_taxpayers: taxpayers.len() - delinquent,
            delinquent_taxpayers: delinquent,
            compliance_by_type: per_type
                .into_iter()
                .map(|(kind, (total, compliant))| (kind, percentage(compliant as u64, total as u64)))
                .collect(),
            generated_at: Utc::now(),
        }
    }

    /// Builds a breakdown of revenue and activity per tax type. Filings count
    /// when their period overlaps `start..=end`.
    #[must_use]
    pub fn tax_type_breakdown(
        payments: &[TaxPayment],
        filings: &[TaxFiling],
        start: NaiveDate,
        end: NaiveDate,
    ) -> TaxTypeBreakdownReport {
        let mut breakdown: BTreeMap<TaxType, TaxBreakdown> = TaxType::ALL
            .iter()
            .map(|tax_type| (*tax_type, TaxBreakdown::default()))
            .collect();

        for payment in completed_in(payments, start, end) {
            let entry = breakdown.entry(payment.tax_type).or_default();
            add(&mut entry.revenue, payment.amount);
            entry.payments_count += 1;
        }
        for filing in filings
            .iter()
            .filter(|f| f.period_start <= end && f.period_end >= start)
        {
            breakdown.entry(filing.filing_type).or_default().filings_count += 1;
        }

        let total_revenue = total(breakdown.values().map(|b| b.revenue));
        for entry in breakdown.values_mut() {
            entry.percentage = percentage(
                u64::try_from(entry.revenue).unwrap_or(0),
                u64::try_from(total_revenue).unwrap_or(0),
            );
        }

        TaxTypeBreakdownReport {
            start_date: start,
            end_date: end,
            total_revenue,
            breakdown_by_type: breakdown,
            generated_at: Utc::now(),
        }
    }
}

fn completed_in(
    payments: &[TaxPayment],
    start: NaiveDate,
    end: NaiveDate,
) -> impl Iterator<Item = &TaxPayment> {
    payments.iter().filter(move |p| {
        p.is_completed() && p.payment_date >= start && p.payment_date <= end
    })
}

fn zeroed_by_type() -> BTreeMap<TaxType, MinorUnits> {
    TaxType::ALL.iter().map(|tax_type| (*tax_type, 0)).collect()
}

fn add(total: &mut MinorUnits, amount: MinorUnits) {
    *total = total.saturating_add(amount);
}

fn total(amounts: impl Iterator<Item = MinorUnits>) -> MinorUnits {
    amounts.fold(0, MinorUnits::saturating_add)
}

/// `part / whole` in percent, rounded to two places. Zero when `whole` is.
fn percentage(part: u64, whole: u64) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole)).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treasury::types::{
        FilingPeriod, NewTaxFiling, NewTaxPayment, NewTaxpayer, PaymentMethod, TaxpayerType,
    };
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use tally_shared::types::Address;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn payment(
        taxpayer_id: TaxpayerId,
        tax_type: TaxType,
        amount: MinorUnits,
        payment_date: NaiveDate,
        completed: bool,
    ) -> TaxPayment {
        let mut payment = TaxPayment::new(NewTaxPayment {
            taxpayer_id,
            filing_id: None,
            tax_type,
            amount,
            payment_method: PaymentMethod::Electronic,
            payment_date,
            notes: String::new(),
        })
        .unwrap();
        if completed {
            payment.mark_completed().unwrap();
        }
        payment
    }

    fn filing(tax_type: TaxType, start: NaiveDate, end: NaiveDate) -> TaxFiling {
        TaxFiling::new(NewTaxFiling {
            taxpayer_id: TaxpayerId::new(),
            tax_year: start.year(),
            period: FilingPeriod::Quarterly,
            period_start: start,
            period_end: end,
            filing_type: tax_type,
            due_date: Utc::now() + Duration::days(30),
        })
        .unwrap()
    }

    fn taxpayer(taxpayer_type: TaxpayerType, status: TaxpayerStatus) -> Taxpayer {
        let mut taxpayer = Taxpayer::new(NewTaxpayer {
            taxpayer_type,
            name: "T".into(),
            tax_identifier: TaxpayerId::new().to_string(),
            contact_email: String::new(),
            contact_phone: String::new(),
            address: Address::default(),
            exemption_codes: Vec::new(),
            annual_revenue: 0,
            business_type: String::new(),
            industry: String::new(),
        });
        taxpayer.status = status;
        taxpayer
    }

    #[test]
    fn test_revenue_counts_completed_payments_in_range() {
        let acme = TaxpayerId::new();
        let ada = TaxpayerId::new();
        let payments = vec![
            payment(acme, TaxType::Sales, 500, date(1, 10), true),
            payment(acme, TaxType::Sales, 250, date(2, 3), true),
            payment(ada, TaxType::Income, 300, date(2, 20), true),
            payment(ada, TaxType::Income, 999, date(2, 21), false),
            payment(ada, TaxType::Income, 999, date(4, 1), true),
        ];
        let names = HashMap::from([(acme, "Acme".to_string())]);

        let report = TaxReports::revenue(&payments, &names, date(1, 1), date(3, 31));

        assert_eq!(report.total_revenue, 1050);
        assert_eq!(report.revenue_by_type[&TaxType::Sales], 750);
        assert_eq!(report.revenue_by_type[&TaxType::Income], 300);
        assert_eq!(report.revenue_by_type[&TaxType::Excise], 0);
        assert_eq!(
            report.monthly_revenue,
            vec![
                MonthlyRevenue {
                    year: 2024,
                    month: 1,
                    revenue: 500
                },
                MonthlyRevenue {
                    year: 2024,
                    month: 2,
                    revenue: 550
                },
            ]
        );
        assert_eq!(report.top_taxpayers[0].taxpayer_name, "Acme");
        assert_eq!(report.top_taxpayers[0].revenue, 750);
        assert_eq!(report.top_taxpayers[1].taxpayer_name, "");
    }

    #[test]
    fn test_filing_status_counts() {
        let mut accepted = filing(TaxType::Income, date(1, 1), date(3, 31));
        accepted.submit().unwrap();
        accepted.accept().unwrap();
        accepted.due_date = Utc::now() - Duration::days(1);
        let mut late = filing(TaxType::Sales, date(1, 1), date(3, 31));
        late.due_date = Utc::now() - Duration::days(1);
        let on_time = filing(TaxType::Sales, date(4, 1), date(6, 30));
        let mut other_year = filing(TaxType::Sales, date(4, 1), date(6, 30));
        other_year.tax_year = 2023;

        let report =
            TaxReports::filing_status(&[accepted, late, on_time, other_year], 2024, Utc::now());

        assert_eq!(report.total_filings, 3);
        assert_eq!(report.overdue_filings, 1);
        assert_eq!(report.filings_by_type[&TaxType::Sales], 2);
        assert_eq!(report.filings_by_status[&crate::treasury::types::FilingStatus::Draft], 2);
    }

    #[test]
    fn test_compliance_percentages() {
        let taxpayers = vec![
            taxpayer(TaxpayerType::Business, TaxpayerStatus::Active),
            taxpayer(TaxpayerType::Business, TaxpayerStatus::Delinquent),
            taxpayer(TaxpayerType::Business, TaxpayerStatus::Exempt),
            taxpayer(TaxpayerType::Individual, TaxpayerStatus::Active),
        ];

        let report = TaxReports::compliance(&taxpayers);

        assert_eq!(report.total_taxpayers, 4);
        assert_eq!(report.compliant_taxpayers, 3);
        assert_eq!(report.delinquent_taxpayers, 1);
        assert_eq!(report.compliance_by_type[&TaxpayerType::Business], dec!(66.67));
        assert_eq!(report.compliance_by_type[&TaxpayerType::Individual], dec!(100));
        assert!(!report.compliance_by_type.contains_key(&TaxpayerType::Government));
    }

    #[test]
    fn test_breakdown_by_type() {
        let payer = TaxpayerId::new();
        let payments = vec![
            payment(payer, TaxType::Sales, 750, date(2, 1), true),
            payment(payer, TaxType::Income, 250, date(2, 1), true),
            payment(payer, TaxType::Income, 100, date(2, 1), false),
        ];
        let filings = vec![
            filing(TaxType::Sales, date(1, 1), date(3, 31)),
            filing(TaxType::Sales, date(4, 1), date(6, 30)),
        ];

        let report = TaxReports::tax_type_breakdown(&payments, &filings, date(1, 1), date(3, 31));

        assert_eq!(report.total_revenue, 1000);
        let sales = &report.breakdown_by_type[&TaxType::Sales];
        assert_eq!(sales.revenue, 750);
        assert_eq!(sales.percentage, dec!(75));
        assert_eq!(sales.filings_count, 1);
        assert_eq!(sales.payments_count, 1);
        assert_eq!(report.breakdown_by_type[&TaxType::Income].percentage, dec!(25));
        assert_eq!(report.breakdown_by_type[&TaxType::Excise], TaxBreakdown::default());
    }

    #[test]
    fn test_empty_inputs() {
        let report = TaxReports::tax_type_breakdown(&[], &[], date(1, 1), date(1, 31));
        assert_eq!(report.total_revenue, 0);
        assert!(
            report
                .breakdown_by_type
                .values()
                .all(|b| b.percentage == Decimal::ZERO)
        );
        assert_eq!(TaxReports::compliance(&[]).total_taxpayers, 0);
    }
}
