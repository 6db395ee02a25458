//! Wiring of repositories into services.

use std::sync::Arc;

use crate::banking::{
    AccountRepository, AccountService, CustomerRepository, CustomerService, MovementRepository,
    TransactionRepository, TransactionService,
};
use crate::store::MemoryStore;
use crate::treasury::{
    TaxFilingRepository, TaxFilingService, TaxPaymentRepository, TaxPaymentService,
    TaxRateRepository, TaxRateService, TaxReportService, TaxpayerRepository, TaxpayerService,
};

/// One implementation of every repository trait.
#[derive(Clone)]
pub struct Repositories {
    /// Customers.
    pub customers: Arc<dyn CustomerRepository>,
    /// Accounts.
    pub accounts: Arc<dyn AccountRepository>,
    /// Transactions.
    pub transactions: Arc<dyn TransactionRepository>,
    /// Atomic account and transaction writes.
    pub movements: Arc<dyn MovementRepository>,
    /// Tax rates.
    pub tax_rates: Arc<dyn TaxRateRepository>,
    /// Taxpayers.
    pub taxpayers: Arc<dyn TaxpayerRepository>,
    /// Tax filings.
    pub filings: Arc<dyn TaxFilingRepository>,
    /// Tax payments.
    pub payments: Arc<dyn TaxPaymentRepository>,
}

impl Repositories {
    /// Backs every repository with one fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            customers: store.clone(),
            accounts: store.clone(),
            transactions: store.clone(),
            movements: store.clone(),
            tax_rates: store.clone(),
            taxpayers: store.clone(),
            filings: store.clone(),
            payments: store,
        }
    }
}

/// Every service of the crate, sharing one set of repositories.
#[derive(Clone)]
pub struct Services {
    /// Customer service.
    pub customers: CustomerService,
    /// Account service.
    pub accounts: AccountService,
    /// Transaction service.
    pub transactions: TransactionService,
    /// Tax rate service.
    pub tax_rates: TaxRateService,
    /// Taxpayer service.
    pub taxpayers: TaxpayerService,
    /// Tax filing service.
    pub filings: TaxFilingService,
    /// Tax payment service.
    pub payments: TaxPaymentService,
    /// Treasury reports.
    pub reports: TaxReportService,
}

impl Services {
    /// Builds every service over `repos`.
    #[must_use]
    pub fn new(repos: &Repositories) -> Self {
        Self {
            customers: CustomerService::new(repos.customers.clone()),
            accounts: AccountService::new(
                repos.accounts.clone(),
                repos.customers.clone(),
                repos.movements.clone(),
            ),
            transactions: TransactionService::new(
                repos.transactions.clone(),
                repos.accounts.clone(),
                repos.movements.clone(),
            ),
            tax_rates: TaxRateService::new(repos.tax_rates.clone()),
            taxpayers: TaxpayerService::new(repos.taxpayers.clone()),
            filings: TaxFilingService::new(repos.filings.clone(), repos.taxpayers.clone()),
            payments: TaxPaymentService::new(repos.payments.clone(), repos.filings.clone()),
            reports: TaxReportService::new(
                repos.payments.clone(),
                repos.filings.clone(),
                repos.taxpayers.clone(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banking::{AccountType, NewAccount, NewCustomer};
    use crate::treasury::types::{
        FilingPeriod, NewTaxFiling, NewTaxPayment, NewTaxpayer, PaymentMethod, TaxType,
        TaxpayerType,
    };
    use chrono::{Duration, NaiveDate, Utc};
    use tally_shared::types::{Address, Currency};

    #[tokio::test]
    async fn test_services_share_one_store() {
        let services = Services::new(&Repositories::in_memory());

        let customer = services
            .customers
            .create(NewCustomer {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@example.test".into(),
                phone_number: String::new(),
                address: Address::default(),
            })
            .await
            .unwrap();
        let account = services
            .accounts
            .create(NewAccount {
                customer_id: customer.id,
                account_type: AccountType::Checking,
                name: "Main".into(),
                currency: Currency::Usd,
            })
            .await
            .unwrap();
        let tx = services
            .accounts
            .deposit(account.id, 5_000, "salary")
            .await
            .unwrap();
        assert_eq!(services.transactions.get(tx.id).await.unwrap(), tx);

        let taxpayer = services
            .taxpayers
            .create(NewTaxpayer {
                taxpayer_type: TaxpayerType::Individual,
                name: "Ada Lovelace".into(),
                tax_identifier: "111-22-3333".into(),
                contact_email: String::new(),
                contact_phone: String::new(),
                address: Address::default(),
                exemption_codes: Vec::new(),
                annual_revenue: 0,
                business_type: String::new(),
                industry: String::new(),
            })
            .await
            .unwrap();
        let filing = services
            .filings
            .create(NewTaxFiling {
                taxpayer_id: taxpayer.id,
                tax_year: 2024,
                period: FilingPeriod::Annual,
                period_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                period_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                filing_type: TaxType::Income,
                due_date: Utc::now() + Duration::days(30),
            })
            .await
            .unwrap();
        let payment = services
            .payments
            .create(NewTaxPayment {
                taxpayer_id: taxpayer.id,
                filing_id: Some(filing.id),
                tax_type: TaxType::Income,
                amount: 1_200,
                payment_method: PaymentMethod::Electronic,
                payment_date: NaiveDate::from_ymd_opt(2024, 4, 15).unwrap(),
                notes: String::new(),
            })
            .await
            .unwrap();
        services.payments.process(payment.id).await.unwrap();

        assert_eq!(services.filings.get(filing.id).await.unwrap().tax_paid, 1_200);
        let report = services
            .reports
            .revenue_report(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(report.total_revenue, 1_200);
        assert_eq!(report.top_taxpayers[0].taxpayer_name, "Ada Lovelace");
    }
}
