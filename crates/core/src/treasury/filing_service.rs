//! Tax filing service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tally_shared::types::{MinorUnits, TaxFilingId, TaxpayerId};

use crate::treasury::error::TreasuryError;
use crate::treasury::filing::TaxFiling;
use crate::treasury::repository::{TaxFilingRepository, TaxpayerRepository};
use crate::treasury::types::{FilingAmounts, FilingPeriod, FilingStatus, NewTaxFiling};

/// Drives filings through their lifecycle.
#[derive(Clone)]
pub struct TaxFilingService {
    filings: Arc<dyn TaxFilingRepository>,
    taxpayers: Arc<dyn TaxpayerRepository>,
}

impl TaxFilingService {
    /// Creates a new filing service.
    pub fn new(
        filings: Arc<dyn TaxFilingRepository>,
        taxpayers: Arc<dyn TaxpayerRepository>,
    ) -> Self {
        Self { filings, taxpayers }
    }

    /// Loads a filing.
    pub async fn get(&self, id: TaxFilingId) -> Result<TaxFiling, TreasuryError> {
        Ok(self.filings.get_by_id(id).await?)
    }

    /// Lists filings.
    pub async fn list(&self, limit: u64, offset: u64) -> Result<Vec<TaxFiling>, TreasuryError> {
        Ok(self.filings.list(limit, offset).await?)
    }

    /// Lists filings of a taxpayer.
    pub async fn list_by_taxpayer(
        &self,
        taxpayer_id: TaxpayerId,
    ) -> Result<Vec<TaxFiling>, TreasuryError> {
        Ok(self.filings.list_by_taxpayer(taxpayer_id).await?)
    }

    /// Lists filings in one status.
    pub async fn list_by_status(
        &self,
        status: FilingStatus,
    ) -> Result<Vec<TaxFiling>, TreasuryError> {
        Ok(self.filings.list_by_status(status).await?)
    }

    /// Lists filings of one tax year and period kind.
    pub async fn list_by_period(
        &self,
        tax_year: i32,
        period: FilingPeriod,
    ) -> Result<Vec<TaxFiling>, TreasuryError> {
        Ok(self.filings.list_by_period(tax_year, period).await?)
    }

    /// Lists filings past due and still open.
    ///
    /// Narrower than [`TaxFiling::is_overdue`]: a rejected filing is closed
    /// for follow-up, so it is left out here even though it still counts as
    /// overdue in the filing status report.
    pub async fn list_overdue(&self) -> Result<Vec<TaxFiling>, TreasuryError> {
        Ok(self.filings.list_overdue(Utc::now()).await?)
    }

    /// Lists filings submitted within the last `days` days.
    pub async fn list_recently_submitted(&self, days: u32) -> Result<Vec<TaxFiling>, TreasuryError> {
        let since = Utc::now() - Duration::days(i64::from(days));
        Ok(self.filings.list_recently_submitted(since).await?)
    }

    /// Opens a draft filing for an existing taxpayer.
    pub async fn create(&self, input: NewTaxFiling) -> Result<TaxFiling, TreasuryError> {
        self.taxpayers.get_by_id(input.taxpayer_id).await?;
        let filing = TaxFiling::new(input)?;
        self.filings.create(&filing).await?;
        tracing::info!(
            filing_id = %filing.id,
            taxpayer_id = %filing.taxpayer_id,
            tax_year = filing.tax_year,
            period = %filing.period,
            "tax filing opened"
        );
        Ok(filing)
    }

    /// Replaces the reported amounts of a draft.
    pub async fn update_amounts(
        &self,
        id: TaxFilingId,
        amounts: FilingAmounts,
    ) -> Result<TaxFiling, TreasuryError> {
        self.modify(id, |filing| filing.update_amounts(amounts)).await
    }

    /// Claims a deduction on a draft.
    pub async fn add_deduction(
        &self,
        id: TaxFilingId,
        code: &str,
        description: &str,
        amount: MinorUnits,
    ) -> Result<TaxFiling, TreasuryError> {
        self.modify(id, |filing| filing.add_deduction(code, description, amount))
            .await
    }

    /// Claims a credit on a draft.
    pub async fn add_credit(
        &self,
        id: TaxFilingId,
        code: &str,
        description: &str,
        amount: MinorUnits,
    ) -> Result<TaxFiling, TreasuryError> {
        self.modify(id, |filing| filing.add_credit(code, description, amount))
            .await
    }

    /// Hands in a draft.
    pub async fn submit(&self, id: TaxFilingId) -> Result<TaxFiling, TreasuryError> {
        let filing = self.modify(id, TaxFiling::submit).await?;
        tracing::info!(filing_id = %filing.id, "tax filing submitted");
        Ok(filing)
    }

    /// Starts assessment and records the tax owed.
    pub async fn process(
        &self,
        id: TaxFilingId,
        tax_calculated: MinorUnits,
    ) -> Result<TaxFiling, TreasuryError> {
        self.modify(id, |filing| filing.begin_processing(tax_calculated))
            .await
    }

    /// Accepts a submitted or processing filing.
    pub async fn accept(&self, id: TaxFilingId) -> Result<TaxFiling, TreasuryError> {
        let filing = self.modify(id, TaxFiling::accept).await?;
        tracing::info!(filing_id = %filing.id, "tax filing accepted");
        Ok(filing)
    }

    /// Sends a submitted or processing filing back.
    pub async fn reject(&self, id: TaxFilingId, reason: &str) -> Result<TaxFiling, TreasuryError> {
        let filing = self.modify(id, |filing| filing.reject(reason)).await?;
        tracing::info!(filing_id = %filing.id, reason, "tax filing rejected");
        Ok(filing)
    }

    /// Stores a new amended filing derived from `id`. The original is not
    /// modified.
    pub async fn amend(&self, id: TaxFilingId) -> Result<TaxFiling, TreasuryError> {
        let original = self.filings.get_by_id(id).await?;
        let amended = original.amend()?;
        self.filings.create(&amended).await?;
        tracing::info!(
            filing_id = %amended.id,
            amended_from = %original.id,
            "tax filing amended"
        );
        Ok(amended)
    }

    async fn modify(
        &self,
        id: TaxFilingId,
        change: impl FnOnce(&mut TaxFiling) -> Result<(), TreasuryError> + Send,
    ) -> Result<TaxFiling, TreasuryError> {
        let mut filing = self.filings.get_by_id(id).await?;
        change(&mut filing)?;
        Ok(self.filings.update(&filing).await?)
    }
}
