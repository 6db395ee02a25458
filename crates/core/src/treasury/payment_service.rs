//! Tax payment service.
//!
//! Completing or refunding a payment linked to a filing also adjusts the
//! filing's paid total. That second write is best effort: if it fails the
//! error is logged and the payment's own change stands.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tally_shared::types::{MinorUnits, TaxFilingId, TaxPaymentId, TaxpayerId};

use crate::codes::{CODE_ATTEMPTS, collides_on, prefixed_code};
use crate::error::RepositoryError;
use crate::treasury::error::TreasuryError;
use crate::treasury::payment::TaxPayment;
use crate::treasury::repository::{TaxFilingRepository, TaxPaymentRepository};
use crate::treasury::types::{NewTaxPayment, PaymentStatus, TaxType};

#[derive(Debug, Clone, Copy)]
enum Reconcile {
    Paid,
    Refunded,
}

/// Records payments and settles them against filings.
#[derive(Clone)]
pub struct TaxPaymentService {
    payments: Arc<dyn TaxPaymentRepository>,
    filings: Arc<dyn TaxFilingRepository>,
}

impl TaxPaymentService {
    /// Creates a new payment service.
    pub fn new(
        payments: Arc<dyn TaxPaymentRepository>,
        filings: Arc<dyn TaxFilingRepository>,
    ) -> Self {
        Self { payments, filings }
    }

    /// Loads a payment.
    pub async fn get(&self, id: TaxPaymentId) -> Result<TaxPayment, TreasuryError> {
        Ok(self.payments.get_by_id(id).await?)
    }

    /// Finds a payment by confirmation code.
    pub async fn get_by_confirmation_code(&self, code: &str) -> Result<TaxPayment, TreasuryError> {
        self.payments
            .get_by_confirmation_code(code)
            .await?
            .ok_or_else(|| RepositoryError::not_found("tax payment", code).into())
    }

    /// Lists payments.
    pub async fn list(&self, limit: u64, offset: u64) -> Result<Vec<TaxPayment>, TreasuryError> {
        Ok(self.payments.list(limit, offset).await?)
    }

    /// Lists payments of a taxpayer.
    pub async fn list_by_taxpayer(
        &self,
        taxpayer_id: TaxpayerId,
    ) -> Result<Vec<TaxPayment>, TreasuryError> {
        Ok(self.payments.list_by_taxpayer(taxpayer_id).await?)
    }

    /// Lists payments against a filing.
    pub async fn list_by_filing(
        &self,
        filing_id: TaxFilingId,
    ) -> Result<Vec<TaxPayment>, TreasuryError> {
        Ok(self.payments.list_by_filing(filing_id).await?)
    }

    /// Lists payments in one status.
    pub async fn list_by_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<TaxPayment>, TreasuryError> {
        Ok(self.payments.list_by_status(status).await?)
    }

    /// Lists payments with a value date in `start..=end`.
    pub async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaxPayment>, TreasuryError> {
        ensure_range(start, end)?;
        Ok(self.payments.list_by_date_range(start, end).await?)
    }

    /// Lists payments recorded within the last `days` days.
    pub async fn list_recent(&self, days: u32) -> Result<Vec<TaxPayment>, TreasuryError> {
        let since = Utc::now() - Duration::days(i64::from(days));
        Ok(self.payments.list_recent(since).await?)
    }

    /// Sum of completed payments of `tax_type` with a value date in
    /// `start..=end`.
    pub async fn total_by_tax_type(
        &self,
        tax_type: TaxType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MinorUnits, TreasuryError> {
        ensure_range(start, end)?;
        Ok(self.payments.total_by_tax_type(tax_type, start, end).await?)
    }

    /// Records a pending payment. A referenced filing must exist.
    pub async fn create(&self, input: NewTaxPayment) -> Result<TaxPayment, TreasuryError> {
        if let Some(filing_id) = input.filing_id {
            self.filings.get_by_id(filing_id).await?;
        }
        let mut payment = TaxPayment::new(input)?;
        let mut attempt = 1;
        loop {
            match self.payments.create(&payment).await {
                Ok(()) => break,
                Err(err) if attempt < CODE_ATTEMPTS && collides_on(&err, "confirmation_code") => {
                    tracing::warn!(
                        confirmation_code = %payment.confirmation_code,
                        "confirmation code already taken, regenerating"
                    );
                    payment.confirmation_code = prefixed_code("PAY");
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
        tracing::info!(
            confirmation_code = %payment.confirmation_code,
            taxpayer_id = %payment.taxpayer_id,
            amount = payment.amount,
            "tax payment recorded"
        );
        Ok(payment)
    }

    /// Completes a pending payment and adds it to the linked filing's paid
    /// total.
    pub async fn process(&self, id: TaxPaymentId) -> Result<TaxPayment, TreasuryError> {
        let mut payment = self.payments.get_by_id(id).await?;
        payment.mark_completed()?;
        let payment = self.payments.update(&payment).await?;
        tracing::info!(confirmation_code = %payment.confirmation_code, "tax payment completed");

        self.reconcile(&payment, Reconcile::Paid).await;
        Ok(payment)
    }

    /// Fails a pending payment.
    pub async fn mark_failed(
        &self,
        id: TaxPaymentId,
        reason: &str,
    ) -> Result<TaxPayment, TreasuryError> {
        let mut payment = self.payments.get_by_id(id).await?;
        payment.mark_failed(reason)?;
        Ok(self.payments.update(&payment).await?)
    }

    /// Refunds a completed payment and removes it from the linked filing's
    /// paid total.
    pub async fn refund(&self, id: TaxPaymentId, reason: &str) -> Result<TaxPayment, TreasuryError> {
        let mut payment = self.payments.get_by_id(id).await?;
        payment.refund(reason)?;
        let payment = self.payments.update(&payment).await?;
        tracing::info!(confirmation_code = %payment.confirmation_code, "tax payment refunded");

        self.reconcile(&payment, Reconcile::Refunded).await;
        Ok(payment)
    }

    /// Cancels a pending payment.
    pub async fn void(&self, id: TaxPaymentId, reason: &str) -> Result<TaxPayment, TreasuryError> {
        let mut payment = self.payments.get_by_id(id).await?;
        payment.void(reason)?;
        Ok(self.payments.update(&payment).await?)
    }

    /// Changes the amount of a pending payment.
    pub async fn update_amount(
        &self,
        id: TaxPaymentId,
        amount: MinorUnits,
    ) -> Result<TaxPayment, TreasuryError> {
        let mut payment = self.payments.get_by_id(id).await?;
        payment.update_amount(amount)?;
        Ok(self.payments.update(&payment).await?)
    }

    async fn reconcile(&self, payment: &TaxPayment, direction: Reconcile) {
        let Some(filing_id) = payment.filing_id else {
            return;
        };
        if let Err(err) = self.apply_to_filing(filing_id, payment.amount, direction).await {
            tracing::error!(
                filing_id = %filing_id,
                confirmation_code = %payment.confirmation_code,
                ?direction,
                error = %err,
                "failed to reconcile filing paid amount"
            );
        }
    }

    async fn apply_to_filing(
        &self,
        filing_id: TaxFilingId,
        amount: MinorUnits,
        direction: Reconcile,
    ) -> Result<(), TreasuryError> {
        let mut filing = self.filings.get_by_id(filing_id).await?;
        match direction {
            Reconcile::Paid => filing.record_payment(amount)?,
            Reconcile::Refunded => filing.reverse_payment(amount),
        }
        self.filings.update(&filing).await?;
        Ok(())
    }
}

pub(crate) fn ensure_range(start: NaiveDate, end: NaiveDate) -> Result<(), TreasuryError> {
    if start > end {
        return Err(TreasuryError::InvalidInput(format!(
            "start date {start} is after end date {end}"
        )));
    }
    Ok(())
}
