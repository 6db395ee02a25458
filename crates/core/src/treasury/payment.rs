//! Tax payment entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{MinorUnits, TaxFilingId, TaxPaymentId, TaxpayerId};

use crate::codes::prefixed_code;
use crate::treasury::error::TreasuryError;
use crate::treasury::types::{NewTaxPayment, PaymentMethod, PaymentStatus, TaxType};

/// A payment of tax by a taxpayer, optionally against a filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPayment {
    /// Identifier.
    pub id: TaxPaymentId,
    /// Paying taxpayer.
    pub taxpayer_id: TaxpayerId,
    /// Filing the payment settles, if any.
    pub filing_id: Option<TaxFilingId>,
    /// Kind of tax paid.
    pub tax_type: TaxType,
    /// Amount in minor units, always positive.
    pub amount: MinorUnits,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Lifecycle status.
    pub status: PaymentStatus,
    /// Value date.
    pub payment_date: NaiveDate,
    /// `PAY-` followed by eight hex digits (unique).
    pub confirmation_code: String,
    /// Free text notes; failure, refund and void reasons are appended.
    pub notes: String,
    /// When the payment completed.
    pub processed_at: Option<DateTime<Utc>>,
    /// When the payment was refunded.
    pub refunded_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency token, bumped by every stored update.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaxPayment {
    /// Records a pending payment.
    pub fn new(input: NewTaxPayment) -> Result<Self, TreasuryError> {
        ensure_positive(input.amount)?;

        let now = Utc::now();
        Ok(Self {
            id: TaxPaymentId::new(),
            taxpayer_id: input.taxpayer_id,
            filing_id: input.filing_id,
            tax_type: input.tax_type,
            amount: input.amount,
            payment_method: input.payment_method,
            status: PaymentStatus::Pending,
            payment_date: input.payment_date,
            confirmation_code: prefixed_code("PAY"),
            notes: input.notes,
            processed_at: None,
            refunded_at: None,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns true once the payment has settled.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    /// Settles a pending payment.
    pub fn mark_completed(&mut self) -> Result<(), TreasuryError> {
        self.ensure_status(PaymentStatus::Pending, "complete")?;
        let now = Utc::now();
        self.status = PaymentStatus::Completed;
        self.processed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Fails a pending payment. A non-empty `reason` is appended to the notes.
    pub fn mark_failed(&mut self, reason: &str) -> Result<(), TreasuryError> {
        self.ensure_status(PaymentStatus::Pending, "fail")?;
        self.status = PaymentStatus::Failed;
        if !reason.is_empty() {
            self.append_note("Failure reason", reason);
        }
        self.touch();
        Ok(())
    }

    /// Returns a completed payment to the taxpayer.
    pub fn refund(&mut self, reason: &str) -> Result<(), TreasuryError> {
        self.ensure_status(PaymentStatus::Completed, "refund")?;
        let now = Utc::now();
        self.status = PaymentStatus::Refunded;
        self.refunded_at = Some(now);
        self.append_note("Refund reason", reason);
        self.updated_at = now;
        Ok(())
    }

    /// Cancels a pending payment.
    pub fn void(&mut self, reason: &str) -> Result<(), TreasuryError> {
        self.ensure_status(PaymentStatus::Pending, "void")?;
        self.status = PaymentStatus::Voided;
        self.append_note("Void reason", reason);
        self.touch();
        Ok(())
    }

    /// Changes the amount of a pending payment.
    pub fn update_amount(&mut self, amount: MinorUnits) -> Result<(), TreasuryError> {
        self.ensure_status(PaymentStatus::Pending, "update")?;
        ensure_positive(amount)?;
        self.amount = amount;
        self.touch();
        Ok(())
    }

    fn append_note(&mut self, label: &str, reason: &str) {
        self.notes.push('\n');
        self.notes.push_str(label);
        self.notes.push_str(": ");
        self.notes.push_str(reason);
    }

    fn ensure_status(
        &self,
        expected: PaymentStatus,
        action: &'static str,
    ) -> Result<(), TreasuryError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(TreasuryError::InvalidPaymentStatus {
                confirmation_code: self.confirmation_code.clone(),
                status: self.status,
                action,
            })
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn ensure_positive(amount: MinorUnits) -> Result<(), TreasuryError> {
    if amount > 0 {
        Ok(())
    } else {
        Err(TreasuryError::InvalidPaymentAmount(amount))
    }
}
