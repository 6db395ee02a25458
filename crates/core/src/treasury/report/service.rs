//! Report service: loads records and hands them to [`TaxReports`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};

use super::builder::TaxReports;
use super::types::{
    FilingStatusReport, RevenueReport, TaxTypeBreakdownReport, TaxpayerComplianceReport,
};
use crate::error::ErrorKind;
use crate::treasury::error::TreasuryError;
use crate::treasury::filing::TaxFiling;
use crate::treasury::payment_service::ensure_range;
use crate::treasury::repository::{TaxFilingRepository, TaxPaymentRepository, TaxpayerRepository};
use crate::treasury::taxpayer::Taxpayer;

const TAXPAYER_PAGE: u64 = 500;

/// Builds treasury reports from stored data.
#[derive(Clone)]
pub struct TaxReportService {
    payments: Arc<dyn TaxPaymentRepository>,
    filings: Arc<dyn TaxFilingRepository>,
    taxpayers: Arc<dyn TaxpayerRepository>,
}

impl TaxReportService {
    /// Creates a new report service.
    pub fn new(
        payments: Arc<dyn TaxPaymentRepository>,
        filings: Arc<dyn TaxFilingRepository>,
        taxpayers: Arc<dyn TaxpayerRepository>,
    ) -> Self {
        Self {
            payments,
            filings,
            taxpayers,
        }
    }

    /// Completed revenue with value dates in `start..=end`.
    pub async fn revenue_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RevenueReport, TreasuryError> {
        ensure_range(start, end)?;
        let payments = self.payments.list_by_date_range(start, end).await?;

        let mut names = HashMap::new();
        for payment in &payments {
            if names.contains_key(&payment.taxpayer_id) {
                continue;
            }
            match self.taxpayers.get_by_id(payment.taxpayer_id).await {
                Ok(taxpayer) => {
                    names.insert(taxpayer.id, taxpayer.name);
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        let report = TaxReports::revenue(&payments, &names, start, end);
        tracing::info!(%start, %end, total_revenue = report.total_revenue, "revenue report built");
        Ok(report)
    }

    /// Filing counts for one tax year.
    pub async fn filing_status_report(
        &self,
        tax_year: i32,
    ) -> Result<FilingStatusReport, TreasuryError> {
        let filings = self.filings.list_by_year(tax_year).await?;
        Ok(TaxReports::filing_status(&filings, tax_year, Utc::now()))
    }

    /// Compliance of every registered taxpayer.
    pub async fn compliance_report(&self) -> Result<TaxpayerComplianceReport, TreasuryError> {
        let taxpayers = self.all_taxpayers().await?;
        Ok(TaxReports::compliance(&taxpayers))
    }

    /// Revenue and activity per tax type over `start..=end`.
    pub async fn tax_type_breakdown(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TaxTypeBreakdownReport, TreasuryError> {
        ensure_range(start, end)?;
        let payments = self.payments.list_by_date_range(start, end).await?;
        let filings = self.filings_between(start, end).await?;
        Ok(TaxReports::tax_type_breakdown(&payments, &filings, start, end))
    }

    /// Filings of every tax year touched by the range. The builder narrows
    /// them down by period overlap.
    async fn filings_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaxFiling>, TreasuryError> {
        let mut filings = Vec::new();
        for year in start.year()..=end.year() {
            filings.extend(self.filings.list_by_year(year).await?);
        }
        Ok(filings)
    }

    async fn all_taxpayers(&self) -> Result<Vec<Taxpayer>, TreasuryError> {
        let mut taxpayers = Vec::new();
        let mut offset = 0;
        loop {
            let batch = self.taxpayers.list(TAXPAYER_PAGE, offset).await?;
            let done = (batch.len() as u64) < TAXPAYER_PAGE;
            offset += batch.len() as u64;
            taxpayers.extend(batch);
            if done {
                return Ok(taxpayers);
            }
        }
    }
}
