//! Treasury repositories over [`MemoryStore`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tally_shared::types::{MinorUnits, TaxFilingId, TaxPaymentId, TaxRateId, TaxpayerId};

use super::MemoryStore;
use super::table::{Record, page};
use crate::error::RepositoryError;
use crate::treasury::types::{
    FilingPeriod, FilingStatus, PaymentStatus, TaxType, TaxpayerStatus, TaxpayerType,
};
use crate::treasury::{
    TaxFiling, TaxFilingRepository, TaxPayment, TaxPaymentRepository, TaxRate,
    TaxRateRepository, Taxpayer, TaxpayerRepository,
};

impl Record for TaxRate {
    type Id = TaxRateId;
    const ENTITY: &'static str = "tax rate";

    fn id(&self) -> TaxRateId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for Taxpayer {
    type Id = TaxpayerId;
    const ENTITY: &'static str = "taxpayer";

    fn id(&self) -> TaxpayerId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("tax_identifier", self.tax_identifier.clone())]
    }
}

impl Record for TaxFiling {
    type Id = TaxFilingId;
    const ENTITY: &'static str = "tax filing";

    fn id(&self) -> TaxFilingId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn version(&self) -> Option<i64> {
        Some(self.version)
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

impl Record for TaxPayment {
    type Id = TaxPaymentId;
    const ENTITY: &'static str = "tax payment";

    fn id(&self) -> TaxPaymentId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("confirmation_code", self.confirmation_code.clone())]
    }

    fn version(&self) -> Option<i64> {
        Some(self.version)
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

#[async_trait]
impl TaxRateRepository for MemoryStore {
    async fn get_by_id(&self, id: TaxRateId) -> Result<TaxRate, RepositoryError> {
        self.tax_rates.read().await.get(id)
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<TaxRate>, RepositoryError> {
        Ok(page(self.tax_rates.read().await.all(), limit, offset))
    }

    async fn list_by_type(&self, tax_type: TaxType) -> Result<Vec<TaxRate>, RepositoryError> {
        Ok(self
            .tax_rates
            .read()
            .await
            .filter(|r| r.tax_type == tax_type))
    }

    async fn list_active(&self, date: NaiveDate) -> Result<Vec<TaxRate>, RepositoryError> {
        Ok(self
            .tax_rates
            .read()
            .await
            .filter(|r| r.is_active() && r.is_in_effect(date)))
    }

    async fn list_by_jurisdiction(
        &self,
        jurisdiction_code: &str,
    ) -> Result<Vec<TaxRate>, RepositoryError> {
        Ok(self
            .tax_rates
            .read()
            .await
            .filter(|r| r.jurisdiction_code == jurisdiction_code))
    }

    async fn rates_for_income(
        &self,
        jurisdiction_code: &str,
        amount: MinorUnits,
        date: NaiveDate,
    ) -> Result<Vec<TaxRate>, RepositoryError> {
        Ok(self.tax_rates.read().await.filter(|r| {
            r.tax_type == TaxType::Income
                && r.jurisdiction_code == jurisdiction_code
                && r.is_active()
                && r.is_in_effect(date)
                && r.is_applicable(amount)
        }))
    }

    async fn create(&self, rate: &TaxRate) -> Result<(), RepositoryError> {
        self.tax_rates.write().await.insert(rate)
    }

    async fn update(&self, rate: &TaxRate) -> Result<TaxRate, RepositoryError> {
        self.tax_rates.write().await.update(rate)
    }
}

#[async_trait]
impl TaxpayerRepository for MemoryStore {
    async fn get_by_id(&self, id: TaxpayerId) -> Result<Taxpayer, RepositoryError> {
        self.taxpayers.read().await.get(id)
    }

    async fn get_by_tax_identifier(
        &self,
        tax_identifier: &str,
    ) -> Result<Option<Taxpayer>, RepositoryError> {
        Ok(self
            .taxpayers
            .read()
            .await
            .find(|t| t.tax_identifier == tax_identifier))
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Taxpayer>, RepositoryError> {
        Ok(page(self.taxpayers.read().await.all(), limit, offset))
    }

    async fn list_by_type(
        &self,
        taxpayer_type: TaxpayerType,
    ) -> Result<Vec<Taxpayer>, RepositoryError> {
        Ok(self
            .taxpayers
            .read()
            .await
            .filter(|t| t.taxpayer_type == taxpayer_type))
    }

    async fn list_by_status(
        &self,
        status: TaxpayerStatus,
    ) -> Result<Vec<Taxpayer>, RepositoryError> {
        Ok(self.taxpayers.read().await.filter(|t| t.status == status))
    }

    async fn list_businesses_by_industry(
        &self,
        industry: &str,
    ) -> Result<Vec<Taxpayer>, RepositoryError> {
        Ok(self.taxpayers.read().await.filter(|t| {
            t.taxpayer_type == TaxpayerType::Business && t.industry == industry
        }))
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<Taxpayer>, RepositoryError> {
        let needle = query.to_lowercase();
        let rows = self.taxpayers.read().await.filter(|t| t.matches(&needle));
        Ok(page(rows, limit, 0))
    }

    async fn create(&self, taxpayer: &Taxpayer) -> Result<(), RepositoryError> {
        self.taxpayers.write().await.insert(taxpayer)
    }

    async fn update(&self, taxpayer: &Taxpayer) -> Result<Taxpayer, RepositoryError> {
        self.taxpayers.write().await.update(taxpayer)
    }
}

#[async_trait]
impl TaxFilingRepository for MemoryStore {
    async fn get_by_id(&self, id: TaxFilingId) -> Result<TaxFiling, RepositoryError> {
        self.filings.read().await.get(id)
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<TaxFiling>, RepositoryError> {
        Ok(page(self.filings.read().await.all(), limit, offset))
    }

    async fn list_by_taxpayer(
        &self,
        taxpayer_id: TaxpayerId,
    ) -> Result<Vec<TaxFiling>, RepositoryError> {
        Ok(self
            .filings
            .read()
            .await
            .filter(|f| f.taxpayer_id == taxpayer_id))
    }

    async fn list_by_status(
        &self,
        status: FilingStatus,
    ) -> Result<Vec<TaxFiling>, RepositoryError> {
        Ok(self.filings.read().await.filter(|f| f.status == status))
    }

    async fn list_by_period(
        &self,
        tax_year: i32,
        period: FilingPeriod,
    ) -> Result<Vec<TaxFiling>, RepositoryError> {
        Ok(self
            .filings
            .read()
            .await
            .filter(|f| f.tax_year == tax_year && f.period == period))
    }

    async fn list_by_year(&self, tax_year: i32) -> Result<Vec<TaxFiling>, RepositoryError> {
        Ok(self.filings.read().await.filter(|f| f.tax_year == tax_year))
    }

    async fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<TaxFiling>, RepositoryError> {
        Ok(self.filings.read().await.filter(|f| {
            f.due_date < now
                && !matches!(f.status, FilingStatus::Accepted | FilingStatus::Rejected)
        }))
    }

    async fn list_recently_submitted(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<TaxFiling>, RepositoryError> {
        Ok(self
            .filings
            .read()
            .await
            .filter(|f| f.submission_date.is_some_and(|at| at >= since)))
    }

    async fn create(&self, filing: &TaxFiling) -> Result<(), RepositoryError> {
        self.filings.write().await.insert(filing)
    }

    async fn update(&self, filing: &TaxFiling) -> Result<TaxFiling, RepositoryError> {
        self.filings.write().await.update(filing)
    }
}

#[async_trait]
impl TaxPaymentRepository for MemoryStore {
    async fn get_by_id(&self, id: TaxPaymentId) -> Result<TaxPayment, RepositoryError> {
        self.payments.read().await.get(id)
    }

    async fn get_by_confirmation_code(
        &self,
        code: &str,
    ) -> Result<Option<TaxPayment>, RepositoryError> {
        Ok(self
            .payments
            .read()
            .await
            .find(|p| p.confirmation_code == code))
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<TaxPayment>, RepositoryError> {
        Ok(page(self.payments.read().await.all(), limit, offset))
    }

    async fn list_by_taxpayer(
        &self,
        taxpayer_id: TaxpayerId,
    ) -> Result<Vec<TaxPayment>, RepositoryError> {
        Ok(self
            .payments
            .read()
            .await
            .filter(|p| p.taxpayer_id == taxpayer_id))
    }

    async fn list_by_filing(
        &self,
        filing_id: TaxFilingId,
    ) -> Result<Vec<TaxPayment>, RepositoryError> {
        Ok(self
            .payments
            .read()
            .await
            .filter(|p| p.filing_id == Some(filing_id)))
    }

    async fn list_by_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<TaxPayment>, RepositoryError> {
        Ok(self.payments.read().await.filter(|p| p.status == status))
    }

    async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaxPayment>, RepositoryError> {
        Ok(self
            .payments
            .read()
            .await
            .filter(|p| (start..=end).contains(&p.payment_date)))
    }

    async fn list_recent(&self, since: DateTime<Utc>) -> Result<Vec<TaxPayment>, RepositoryError> {
        Ok(self
            .payments
            .read()
            .await
            .filter(|p| p.created_at >= since))
    }

    async fn total_by_tax_type(
        &self,
        tax_type: TaxType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MinorUnits, RepositoryError> {
        let total = self
            .payments
            .read()
            .await
            .filter(|p| {
                p.tax_type == tax_type
                    && p.is_completed()
                    && (start..=end).contains(&p.payment_date)
            })
            .iter()
            .fold(0, |total: MinorUnits, p| total.saturating_add(p.amount));
        Ok(total)
    }

    async fn create(&self, payment: &TaxPayment) -> Result<(), RepositoryError> {
        self.payments.write().await.insert(payment)
    }

    async fn update(&self, payment: &TaxPayment) -> Result<TaxPayment, RepositoryError> {
        self.payments.write().await.update(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::treasury::types::{NewTaxFiling, NewTaxPayment, NewTaxpayer, PaymentMethod};
    use chrono::Duration;
    use tally_shared::types::Address;

    fn taxpayer(tax_identifier: &str) -> Taxpayer {
        Taxpayer::new(NewTaxpayer {
            taxpayer_type: TaxpayerType::Business,
            name: "Acme Retail".into(),
            tax_identifier: tax_identifier.into(),
            contact_email: "tax@acme.test".into(),
            contact_phone: String::new(),
            address: Address::default(),
            exemption_codes: Vec::new(),
            annual_revenue: 0,
            business_type: String::new(),
            industry: "retail".into(),
        })
    }

    fn filing(due_in_days: i64) -> TaxFiling {
        TaxFiling::new(NewTaxFiling {
            taxpayer_id: TaxpayerId::new(),
            tax_year: 2024,
            period: FilingPeriod::Quarterly,
            period_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            filing_type: TaxType::Sales,
            due_date: Utc::now() + Duration::days(due_in_days),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_taxpayer_identifier_is_unique() {
        let store = MemoryStore::new();
        TaxpayerRepository::create(&store, &taxpayer("12-3456789"))
            .await
            .unwrap();

        let err = TaxpayerRepository::create(&store, &taxpayer("12-3456789"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let store = MemoryStore::new();
        TaxpayerRepository::create(&store, &taxpayer("12-3456789"))
            .await
            .unwrap();

        assert_eq!(store.search("ACME", 10).await.unwrap().len(), 1);
        assert_eq!(store.search("Acme.TEST", 10).await.unwrap().len(), 1);
        assert!(store.search("globex", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filing_update_checks_version() {
        let store = MemoryStore::new();
        let filing = filing(30);
        TaxFilingRepository::create(&store, &filing).await.unwrap();

        let mut first = filing.clone();
        first.submit().unwrap();
        let stored = TaxFilingRepository::update(&store, &first).await.unwrap();
        assert_eq!(stored.version, 2);

        let mut stale = filing;
        stale.notes = "stale".into();
        let err = TaxFilingRepository::update(&store, &stale)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_overdue_excludes_closed_filings() {
        let store = MemoryStore::new();
        let open = filing(-1);
        let mut accepted = filing(-1);
        accepted.submit().unwrap();
        accepted.accept().unwrap();
        let mut rejected = filing(-1);
        rejected.submit().unwrap();
        rejected.reject("incomplete").unwrap();
        for f in [&open, &accepted, &rejected, &filing(5)] {
            TaxFilingRepository::create(&store, f).await.unwrap();
        }

        let overdue = store.list_overdue(Utc::now()).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, open.id);
    }

    #[tokio::test]
    async fn test_payment_totals_count_completed_only() {
        let store = MemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        for (amount, complete) in [(100, true), (200, true), (400, false)] {
            let mut payment = TaxPayment::new(NewTaxPayment {
                taxpayer_id: TaxpayerId::new(),
                filing_id: None,
                tax_type: TaxType::Sales,
                amount,
                payment_method: PaymentMethod::Cash,
                payment_date: day,
                notes: String::new(),
            })
            .unwrap();
            if complete {
                payment.mark_completed().unwrap();
            }
            TaxPaymentRepository::create(&store, &payment).await.unwrap();
        }

        let total = store
            .total_by_tax_type(TaxType::Sales, day, day)
            .await
            .unwrap();
        assert_eq!(total, 300);
        assert_eq!(
            store
                .total_by_tax_type(TaxType::Income, day, day)
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            store
                .list_by_date_range(day + Duration::days(1), day + Duration::days(2))
                .await
                .unwrap()
                .len(),
            0
        );
    }
}
