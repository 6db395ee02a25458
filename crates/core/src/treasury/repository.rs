//! Storage seams for the treasury domain.
//!
//! Unpaged lookups return every match ordered by creation time.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tally_shared::types::{MinorUnits, TaxFilingId, TaxPaymentId, TaxRateId, TaxpayerId};

use crate::error::RepositoryError;
use crate::treasury::filing::TaxFiling;
use crate::treasury::payment::TaxPayment;
use crate::treasury::tax_rate::TaxRate;
use crate::treasury::taxpayer::Taxpayer;
use crate::treasury::types::{
    FilingPeriod, FilingStatus, PaymentStatus, TaxType, TaxpayerStatus, TaxpayerType,
};

/// Tax rate persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxRateRepository: Send + Sync {
    /// Loads a tax rate.
    async fn get_by_id(&self, id: TaxRateId) -> Result<TaxRate, RepositoryError>;

    /// Lists tax rates.
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<TaxRate>, RepositoryError>;

    /// Lists rates of one kind of tax.
    async fn list_by_type(&self, tax_type: TaxType) -> Result<Vec<TaxRate>, RepositoryError>;

    /// Lists active rates in effect on `date`.
    async fn list_active(&self, date: NaiveDate) -> Result<Vec<TaxRate>, RepositoryError>;

    /// Lists rates of a jurisdiction.
    async fn list_by_jurisdiction(
        &self,
        jurisdiction_code: &str,
    ) -> Result<Vec<TaxRate>, RepositoryError>;

    /// Lists active income rates of a jurisdiction, in effect on `date`,
    /// whose band contains `amount`.
    async fn rates_for_income(
        &self,
        jurisdiction_code: &str,
        amount: MinorUnits,
        date: NaiveDate,
    ) -> Result<Vec<TaxRate>, RepositoryError>;

    /// Inserts a tax rate.
    async fn create(&self, rate: &TaxRate) -> Result<(), RepositoryError>;

    /// Replaces a stored tax rate.
    async fn update(&self, rate: &TaxRate) -> Result<TaxRate, RepositoryError>;
}

/// Taxpayer persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxpayerRepository: Send + Sync {
    /// Loads a taxpayer.
    async fn get_by_id(&self, id: TaxpayerId) -> Result<Taxpayer, RepositoryError>;

    /// Finds the taxpayer holding `tax_identifier`, if any.
    async fn get_by_tax_identifier(
        &self,
        tax_identifier: &str,
    ) -> Result<Option<Taxpayer>, RepositoryError>;

    /// Lists taxpayers.
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Taxpayer>, RepositoryError>;

    /// Lists taxpayers of one kind.
    async fn list_by_type(
        &self,
        taxpayer_type: TaxpayerType,
    ) -> Result<Vec<Taxpayer>, RepositoryError>;

    /// Lists taxpayers in one standing.
    async fn list_by_status(
        &self,
        status: TaxpayerStatus,
    ) -> Result<Vec<Taxpayer>, RepositoryError>;

    /// Lists business taxpayers of an industry.
    async fn list_businesses_by_industry(
        &self,
        industry: &str,
    ) -> Result<Vec<Taxpayer>, RepositoryError>;

    /// Case-insensitive substring search over name, tax identifier and
    /// contact email. Returns at most `limit` matches.
    async fn search(&self, query: &str, limit: u64) -> Result<Vec<Taxpayer>, RepositoryError>;

    /// Inserts a taxpayer. Fails with `Duplicate` on a taken tax identifier.
    async fn create(&self, taxpayer: &Taxpayer) -> Result<(), RepositoryError>;

    /// Replaces a stored taxpayer.
    async fn update(&self, taxpayer: &Taxpayer) -> Result<Taxpayer, RepositoryError>;
}

/// Tax filing persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxFilingRepository: Send + Sync {
    /// Loads a filing.
    async fn get_by_id(&self, id: TaxFilingId) -> Result<TaxFiling, RepositoryError>;

    /// Lists filings.
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<TaxFiling>, RepositoryError>;

    /// Lists filings of a taxpayer.
    async fn list_by_taxpayer(
        &self,
        taxpayer_id: TaxpayerId,
    ) -> Result<Vec<TaxFiling>, RepositoryError>;

    /// Lists filings in one status.
    async fn list_by_status(&self, status: FilingStatus)
    -> Result<Vec<TaxFiling>, RepositoryError>;

    /// Lists filings of one tax year and period kind.
    async fn list_by_period(
        &self,
        tax_year: i32,
        period: FilingPeriod,
    ) -> Result<Vec<TaxFiling>, RepositoryError>;

    /// Lists every filing of a tax year.
    async fn list_by_year(&self, tax_year: i32) -> Result<Vec<TaxFiling>, RepositoryError>;

    /// Lists filings past due at `now` that are neither accepted nor
    /// rejected. Rejected filings are excluded even though
    /// [`TaxFiling::is_overdue_at`] reports them as overdue.
    async fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<TaxFiling>, RepositoryError>;

    /// Lists filings submitted at or after `since`.
    async fn list_recently_submitted(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<TaxFiling>, RepositoryError>;

    /// Inserts a filing.
    async fn create(&self, filing: &TaxFiling) -> Result<(), RepositoryError>;

    /// Replaces a stored filing if its version still matches, returning the
    /// stored copy with the bumped version.
    async fn update(&self, filing: &TaxFiling) -> Result<TaxFiling, RepositoryError>;
}

/// Tax payment persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxPaymentRepository: Send + Sync {
    /// Loads a payment.
    async fn get_by_id(&self, id: TaxPaymentId) -> Result<TaxPayment, RepositoryError>;

    /// Finds a payment by confirmation code.
    async fn get_by_confirmation_code(
        &self,
        code: &str,
    ) -> Result<Option<TaxPayment>, RepositoryError>;

    /// Lists payments.
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<TaxPayment>, RepositoryError>;

    /// Lists payments of a taxpayer.
    async fn list_by_taxpayer(
        &self,
        taxpayer_id: TaxpayerId,
    ) -> Result<Vec<TaxPayment>, RepositoryError>;

    /// Lists payments against a filing.
    async fn list_by_filing(
        &self,
        filing_id: TaxFilingId,
    ) -> Result<Vec<TaxPayment>, RepositoryError>;

    /// Lists payments in one status.
    async fn list_by_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<TaxPayment>, RepositoryError>;

    /// Lists payments whose value date lies in `start..=end`.
    async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaxPayment>, RepositoryError>;

    /// Lists payments recorded at or after `since`.
    async fn list_recent(&self, since: DateTime<Utc>) -> Result<Vec<TaxPayment>, RepositoryError>;

    /// Sum of completed payments of `tax_type` with a value date in
    /// `start..=end`.
    async fn total_by_tax_type(
        &self,
        tax_type: TaxType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MinorUnits, RepositoryError>;

    /// Inserts a payment. Fails with `Duplicate` on a taken confirmation code.
    async fn create(&self, payment: &TaxPayment) -> Result<(), RepositoryError>;

    /// Replaces a stored payment.
    async fn update(&self, payment: &TaxPayment) -> Result<TaxPayment, RepositoryError>;
}
