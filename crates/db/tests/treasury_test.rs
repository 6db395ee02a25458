//! Integration tests for the treasury repositories on SQLite.

mod common;

use chrono::{Duration, NaiveDate, Utc};
use rstest::rstest;
use tally_core::ErrorKind;
use tally_core::treasury::{
    BracketType, FilingPeriod, FilingStatus, NewTaxFiling, NewTaxPayment, NewTaxRate,
    NewTaxpayer, PaymentMethod, PaymentStatus, TaxFilingRepository, TaxPaymentRepository,
    TaxType, TaxpayerType,
};
use tally_core::Services;
use tally_shared::types::{Address, TaxPaymentId, TaxpayerId};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_taxpayer(name: &str, tax_identifier: &str) -> NewTaxpayer {
    NewTaxpayer {
        taxpayer_type: TaxpayerType::Business,
        name: name.into(),
        tax_identifier: tax_identifier.into(),
        contact_email: format!("{tax_identifier}@ledger.test"),
        contact_phone: String::new(),
        address: Address::default(),
        exemption_codes: vec!["EX-9".into(), "EX-1".into()],
        annual_revenue: 1_000_000,
        business_type: "llc".into(),
        industry: "retail".into(),
    }
}

async fn register(services: &Services, name: &str, tax_identifier: &str) -> TaxpayerId {
    services
        .taxpayers
        .create(new_taxpayer(name, tax_identifier))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_taxpayer_round_trip_keeps_exemptions() {
    let (services, _) = common::services().await;
    let id = register(&services, "Acme Corp", "12-3456789").await;

    let loaded = services.taxpayers.get(id).await.unwrap();

    assert_eq!(loaded.name, "Acme Corp");
    assert_eq!(
        loaded.exemption_codes.iter().collect::<Vec<_>>(),
        vec!["EX-1", "EX-9"]
    );
    let by_industry = services
        .taxpayers
        .list_businesses_by_industry("retail")
        .await
        .unwrap();
    assert_eq!(by_industry.len(), 1);
}

#[rstest]
#[case("acme", 1)]
#[case("ACME", 1)]
#[case("12-34", 1)]
#[case("LEDGER.TEST", 2)]
#[case("nobody", 0)]
#[tokio::test]
async fn test_search_is_case_insensitive(#[case] query: &str, #[case] expected: usize) {
    let (services, _) = common::services().await;
    register(&services, "Acme Corp", "12-3456789").await;
    register(&services, "Globex", "98-7654321").await;

    let found = services.taxpayers.search(query, 10).await.unwrap();

    assert_eq!(found.len(), expected);
}

#[tokio::test]
async fn test_duplicate_tax_identifier_rejected() {
    let (services, _) = common::services().await;
    register(&services, "Acme Corp", "12-3456789").await;

    let err = services
        .taxpayers
        .create(new_taxpayer("Acme Again", "12-3456789"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn test_income_tax_from_stored_rates() {
    let (services, _) = common::services().await;
    let rate = services
        .tax_rates
        .create(NewTaxRate {
            tax_type: TaxType::Income,
            name: "State income".into(),
            description: String::new(),
            rate: 0.1,
            bracket_type: BracketType::Flat,
            min_amount: None,
            max_amount: None,
            category: None,
            jurisdiction_code: "CA".into(),
            effective_date: date(2020, 1, 1),
            expiration_date: None,
        })
        .await
        .unwrap();
    services.tax_rates.activate(rate.id).await.unwrap();

    let tax = services
        .tax_rates
        .calculate_income_tax("CA", 100_000)
        .await
        .unwrap();

    assert_eq!(tax, 10_000);
    assert_eq!(services.tax_rates.list_active().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_filing_adjustments_and_version_guard() {
    let (services, repos) = common::services().await;
    let taxpayer_id = register(&services, "Acme Corp", "12-3456789").await;
    let filing = services
        .filings
        .create(NewTaxFiling {
            taxpayer_id,
            tax_year: 2024,
            period: FilingPeriod::Annual,
            period_start: date(2024, 1, 1),
            period_end: date(2024, 12, 31),
            filing_type: TaxType::Income,
            due_date: Utc::now() + Duration::days(30),
        })
        .await
        .unwrap();

    let updated = services
        .filings
        .add_deduction(filing.id, "D-1", "Home office", 1_500)
        .await
        .unwrap();
    assert_eq!(updated.version, filing.version + 1);

    let loaded = services.filings.get(filing.id).await.unwrap();
    assert_eq!(loaded.deductions.len(), 1);
    assert_eq!(loaded.deductions[0].amount, 1_500);

    let err = repos.filings.update(&filing).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let submitted = services.filings.submit(filing.id).await.unwrap();
    assert_eq!(submitted.status, FilingStatus::Submitted);
    let recent = services.filings.list_recently_submitted(1).await.unwrap();
    assert_eq!(recent.len(), 1);
}

#[tokio::test]
async fn test_overdue_excludes_closed_filings() {
    let (services, repos) = common::services().await;
    let taxpayer_id = register(&services, "Acme Corp", "12-3456789").await;
    let filing = services
        .filings
        .create(NewTaxFiling {
            taxpayer_id,
            tax_year: 2023,
            period: FilingPeriod::Quarterly,
            period_start: date(2023, 1, 1),
            period_end: date(2023, 3, 31),
            filing_type: TaxType::Sales,
            due_date: Utc::now() - Duration::days(1),
        })
        .await
        .unwrap();

    assert_eq!(services.filings.list_overdue().await.unwrap().len(), 1);

    let mut rejected = filing.clone();
    rejected.status = FilingStatus::Rejected;
    repos.filings.update(&rejected).await.unwrap();

    assert!(services.filings.list_overdue().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_processed_payment_counts_toward_totals() {
    let (services, repos) = common::services().await;
    let taxpayer_id = register(&services, "Acme Corp", "12-3456789").await;
    let payment_input = |amount| NewTaxPayment {
        taxpayer_id,
        filing_id: None,
        tax_type: TaxType::Business,
        amount,
        payment_method: PaymentMethod::Electronic,
        payment_date: date(2024, 6, 30),
        notes: String::new(),
    };

    let paid = services.payments.create(payment_input(700)).await.unwrap();
    services.payments.create(payment_input(300)).await.unwrap();
    let processed = services.payments.process(paid.id).await.unwrap();
    assert_eq!(processed.status, PaymentStatus::Completed);

    let total = repos
        .payments
        .total_by_tax_type(TaxType::Business, date(2024, 1, 1), date(2024, 12, 31))
        .await
        .unwrap();
    assert_eq!(total, 700);

    let in_range = repos
        .payments
        .list_by_date_range(date(2024, 6, 30), date(2024, 6, 30))
        .await
        .unwrap();
    assert_eq!(in_range.len(), 2);

    let mut copy = processed.clone();
    copy.id = TaxPaymentId::new();
    let err = repos.payments.create(&copy).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn test_stale_payment_cannot_complete_twice() {
    let (services, repos) = common::services().await;
    let taxpayer_id = register(&services, "Initech", "98-7654321").await;
    let payment = services
        .payments
        .create(NewTaxPayment {
            taxpayer_id,
            filing_id: None,
            tax_type: TaxType::Sales,
            amount: 1_250,
            payment_method: PaymentMethod::Wire,
            payment_date: date(2024, 4, 15),
            notes: String::new(),
        })
        .await
        .unwrap();

    let mut stale = repos.payments.get_by_id(payment.id).await.unwrap();
    let processed = services.payments.process(payment.id).await.unwrap();
    assert_eq!(processed.version, stale.version + 1);

    stale.mark_completed().unwrap();
    let err = repos.payments.update(&stale).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}
