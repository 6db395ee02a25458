//! Tax filing entity and its lifecycle.
//!
//! A filing is prepared as a draft, submitted, optionally processed, and
//! then accepted or rejected. Reported amounts, deductions and credits can
//! only change while the filing is a draft. Amending never alters the
//! original: it produces a separate filing labelled `amended`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{MinorUnits, TaxFilingId, TaxpayerId};

use crate::treasury::error::TreasuryError;
use crate::treasury::types::{FilingAmounts, FilingPeriod, FilingStatus, NewTaxFiling, TaxType};

/// A deduction or credit claimed on a filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Statutory code.
    pub code: String,
    /// Free text description.
    pub description: String,
    /// Amount in minor units, always positive.
    pub amount: MinorUnits,
}

/// A taxpayer's return for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxFiling {
    /// Identifier.
    pub id: TaxFilingId,
    /// Filing taxpayer.
    pub taxpayer_id: TaxpayerId,
    /// Tax year.
    pub tax_year: i32,
    /// Period kind.
    pub period: FilingPeriod,
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
    /// Kind of tax filed.
    pub filing_type: TaxType,
    /// Lifecycle status.
    pub status: FilingStatus,
    /// Gross income (income tax).
    pub gross_income: MinorUnits,
    /// Taxable income (income tax).
    pub taxable_income: MinorUnits,
    /// Total sales (sales tax).
    pub total_sales: MinorUnits,
    /// Amount subject to tax.
    pub taxable_amount: MinorUnits,
    /// Tax owed as assessed.
    pub tax_calculated: MinorUnits,
    /// Running total of completed payments.
    pub tax_paid: MinorUnits,
    /// When the filing was submitted.
    pub submission_date: Option<DateTime<Utc>>,
    /// When the filing was accepted.
    pub acceptance_date: Option<DateTime<Utc>>,
    /// Deadline.
    pub due_date: DateTime<Utc>,
    /// Deductions in the order claimed.
    pub deductions: Vec<Adjustment>,
    /// Credits in the order claimed.
    pub credits: Vec<Adjustment>,
    /// Free text notes; rejection reasons are appended here.
    pub notes: String,
    /// Optimistic concurrency token, bumped by every stored update.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaxFiling {
    /// Opens a draft filing.
    pub fn new(input: NewTaxFiling) -> Result<Self, TreasuryError> {
        if input.period_end <= input.period_start {
            return Err(TreasuryError::InvalidFilingPeriod {
                start: input.period_start,
                end: input.period_end,
            });
        }

        let now = Utc::now();
        Ok(Self {
            id: TaxFilingId::new(),
            taxpayer_id: input.taxpayer_id,
            tax_year: input.tax_year,
            period: input.period,
            period_start: input.period_start,
            period_end: input.period_end,
            filing_type: input.filing_type,
            status: FilingStatus::Draft,
            gross_income: 0,
            taxable_income: 0,
            total_sales: 0,
            taxable_amount: 0,
            tax_calculated: 0,
            tax_paid: 0,
            submission_date: None,
            acceptance_date: None,
            due_date: input.due_date,
            deductions: Vec::new(),
            credits: Vec::new(),
            notes: String::new(),
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns true once the filing has left draft.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.status != FilingStatus::Draft
    }

    /// Returns true if the deadline has passed without acceptance.
    #[must_use]
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }

    /// [`TaxFiling::is_overdue`] evaluated at `now`.
    #[must_use]
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        now > self.due_date && self.status != FilingStatus::Accepted
    }

    /// Hands in a draft.
    pub fn submit(&mut self) -> Result<(), TreasuryError> {
        self.ensure_status(&[FilingStatus::Draft], "submit")?;
        let now = Utc::now();
        self.status = FilingStatus::Submitted;
        self.submission_date = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Starts assessment of a submitted filing and records the tax owed.
    pub fn begin_processing(&mut self, tax_calculated: MinorUnits) -> Result<(), TreasuryError> {
        self.ensure_status(&[FilingStatus::Submitted], "process")?;
        if tax_calculated < 0 {
            return Err(TreasuryError::InvalidAmount(tax_calculated));
        }
        self.status = FilingStatus::Processing;
        self.tax_calculated = tax_calculated;
        self.touch();
        Ok(())
    }

    /// Accepts a submitted or processing filing.
    pub fn accept(&mut self) -> Result<(), TreasuryError> {
        self.ensure_status(&[FilingStatus::Submitted, FilingStatus::Processing], "accept")?;
        let now = Utc::now();
        self.status = FilingStatus::Accepted;
        self.acceptance_date = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Sends the filing back, appending `reason` to the notes.
    pub fn reject(&mut self, reason: &str) -> Result<(), TreasuryError> {
        self.ensure_status(&[FilingStatus::Submitted, FilingStatus::Processing], "reject")?;
        self.status = FilingStatus::Rejected;
        self.notes.push_str("\nRejection reason: ");
        self.notes.push_str(reason);
        self.touch();
        Ok(())
    }

    /// Produces a new filing that corrects this one.
    ///
    /// The copy has a fresh id, status `amended`, no submission or
    /// acceptance dates, and notes pointing back at this filing. Drafts
    /// cannot be amended; edit them instead. `self` is left untouched.
    pub fn amend(&self) -> Result<Self, TreasuryError> {
        if self.status == FilingStatus::Draft {
            return Err(self.invalid_status("amend"));
        }
        let now = Utc::now();
        Ok(Self {
            id: TaxFilingId::new(),
            taxpayer_id: self.taxpayer_id,
            tax_year: self.tax_year,
            period: self.period,
            period_start: self.period_start,
            period_end: self.period_end,
            filing_type: self.filing_type,
            status: FilingStatus::Amended,
            gross_income: self.gross_income,
            taxable_income: self.taxable_income,
            total_sales: self.total_sales,
            taxable_amount: self.taxable_amount,
            tax_calculated: self.tax_calculated,
            tax_paid: self.tax_paid,
            submission_date: None,
            acceptance_date: None,
            due_date: self.due_date,
            deductions: self.deductions.clone(),
            credits: self.credits.clone(),
            notes: format!("Amended from filing ID: {}", self.id),
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the reported amounts of a draft.
    pub fn update_amounts(&mut self, amounts: FilingAmounts) -> Result<(), TreasuryError> {
        self.ensure_status(&[FilingStatus::Draft], "update amounts of")?;
        if let Some(negative) = [
            amounts.gross_income,
            amounts.taxable_income,
            amounts.total_sales,
            amounts.taxable_amount,
        ]
        .into_iter()
        .find(|a| *a < 0)
        {
            return Err(TreasuryError::InvalidAmount(negative));
        }

        self.gross_income = amounts.gross_income;
        self.taxable_income = amounts.taxable_income;
        self.total_sales = amounts.total_sales;
        self.taxable_amount = amounts.taxable_amount;
        self.touch();
        Ok(())
    }

    /// Claims a deduction on a draft.
    pub fn add_deduction(
        &mut self,
        code: &str,
        description: &str,
        amount: MinorUnits,
    ) -> Result<(), TreasuryError> {
        let item = self.adjustment("add deduction to", code, description, amount)?;
        self.deductions.push(item);
        self.touch();
        Ok(())
    }

    /// Claims a credit on a draft.
    pub fn add_credit(
        &mut self,
        code: &str,
        description: &str,
        amount: MinorUnits,
    ) -> Result<(), TreasuryError> {
        let item = self.adjustment("add credit to", code, description, amount)?;
        self.credits.push(item);
        self.touch();
        Ok(())
    }

    /// Adds a completed payment to the paid total.
    pub fn record_payment(&mut self, amount: MinorUnits) -> Result<(), TreasuryError> {
        self.tax_paid = self
            .tax_paid
            .checked_add(amount)
            .ok_or(TreasuryError::InvalidAmount(amount))?;
        self.touch();
        Ok(())
    }

    /// Removes a refunded payment from the paid total, never going below zero.
    pub fn reverse_payment(&mut self, amount: MinorUnits) {
        self.tax_paid = self.tax_paid.saturating_sub(amount).max(0);
        self.touch();
    }

    /// Sum of all deductions.
    #[must_use]
    pub fn total_deductions(&self) -> MinorUnits {
        sum(&self.deductions)
    }

    /// Sum of all credits.
    #[must_use]
    pub fn total_credits(&self) -> MinorUnits {
        sum(&self.credits)
    }

    /// Tax still owed after credits and payments, never negative.
    #[must_use]
    pub fn balance_due(&self) -> MinorUnits {
        self.tax_calculated
            .saturating_sub(self.total_credits())
            .saturating_sub(self.tax_paid)
            .max(0)
    }

    fn adjustment(
        &self,
        action: &'static str,
        code: &str,
        description: &str,
        amount: MinorUnits,
    ) -> Result<Adjustment, TreasuryError> {
        self.ensure_status(&[FilingStatus::Draft], action)?;
        if amount <= 0 {
            return Err(TreasuryError::InvalidAmount(amount));
        }
        if code.trim().is_empty() {
            return Err(TreasuryError::InvalidInput("code is required".into()));
        }
        Ok(Adjustment {
            code: code.trim().to_string(),
            description: description.to_string(),
            amount,
        })
    }

    fn ensure_status(
        &self,
        allowed: &[FilingStatus],
        action: &'static str,
    ) -> Result<(), TreasuryError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(self.invalid_status(action))
        }
    }

    fn invalid_status(&self, action: &'static str) -> TreasuryError {
        TreasuryError::InvalidFilingStatus {
            id: self.id,
            status: self.status,
            action,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn sum(items: &[Adjustment]) -> MinorUnits {
    items
        .iter()
        .fold(0, |total: MinorUnits, item| total.saturating_add(item.amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::Duration;
    use rstest::rstest;

    fn draft() -> TaxFiling {
        TaxFiling::new(NewTaxFiling {
            taxpayer_id: TaxpayerId::new(),
            tax_year: 2024,
            period: FilingPeriod::Quarterly,
            period_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            filing_type: TaxType::Sales,
            due_date: Utc::now() + Duration::days(30),
        })
        .unwrap()
    }

    fn with_status(status: FilingStatus) -> TaxFiling {
        let mut filing = draft();
        filing.status = status;
        filing
    }

    #[test]
    fn test_new_filing_is_draft() {
        let filing = draft();
        assert_eq!(filing.status, FilingStatus::Draft);
        assert!(!filing.is_submitted());
        assert_eq!(filing.version, 1);
        assert!(filing.deductions.is_empty());
    }

    #[rstest]
    #[case(2024, 3, 31)]
    #[case(2023, 12, 31)]
    fn test_period_end_must_follow_start(#[case] y: i32, #[case] m: u32, #[case] d: u32) {
        let err = TaxFiling::new(NewTaxFiling {
            taxpayer_id: TaxpayerId::new(),
            tax_year: 2024,
            period: FilingPeriod::Monthly,
            period_start: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            period_end: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            filing_type: TaxType::Income,
            due_date: Utc::now(),
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_submit_twice_fails_and_keeps_submission_date() {
        let mut filing = draft();
        filing.submit().unwrap();
        let submitted_at = filing.submission_date;
        assert!(submitted_at.is_some());

        let err = filing.submit().unwrap_err();
        assert!(matches!(err, TreasuryError::InvalidFilingStatus { .. }));
        assert_eq!(filing.submission_date, submitted_at);
        assert_eq!(filing.status, FilingStatus::Submitted);
    }

    #[test]
    fn test_full_lifecycle() {
        let mut filing = draft();
        filing.submit().unwrap();
        filing.begin_processing(1200).unwrap();
        assert_eq!(filing.status, FilingStatus::Processing);
        assert_eq!(filing.tax_calculated, 1200);

        filing.accept().unwrap();
        assert_eq!(filing.status, FilingStatus::Accepted);
        assert!(filing.acceptance_date.is_some());
    }

    #[rstest]
    #[case(FilingStatus::Draft, false)]
    #[case(FilingStatus::Submitted, true)]
    #[case(FilingStatus::Processing, true)]
    #[case(FilingStatus::Accepted, false)]
    #[case(FilingStatus::Rejected, false)]
    #[case(FilingStatus::Amended, false)]
    fn test_accept_and_reject_guards(#[case] status: FilingStatus, #[case] allowed: bool) {
        assert_eq!(with_status(status).accept().is_ok(), allowed);

        let mut filing = with_status(status);
        assert_eq!(filing.reject("missing schedule").is_ok(), allowed);
        if allowed {
            assert_eq!(filing.notes, "\nRejection reason: missing schedule");
        } else {
            assert_eq!(filing.status, status);
        }
    }

    #[test]
    fn test_process_only_from_submitted() {
        let mut filing = with_status(FilingStatus::Processing);
        let err = filing.begin_processing(5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_amend_produces_independent_copy() {
        let mut original = draft();
        original.add_deduction("D1", "equipment", 300).unwrap();
        original.submit().unwrap();
        original.accept().unwrap();

        let mut amended = original.amend().unwrap();
        assert_ne!(amended.id, original.id);
        assert_eq!(amended.status, FilingStatus::Amended);
        assert!(amended.submission_date.is_none());
        assert!(amended.acceptance_date.is_none());
        assert_eq!(amended.notes, format!("Amended from filing ID: {}", original.id));
        assert_eq!(amended.deductions, original.deductions);

        amended.deductions.push(Adjustment {
            code: "D2".into(),
            description: String::new(),
            amount: 1,
        });
        assert_eq!(original.deductions.len(), 1);
        assert_eq!(original.status, FilingStatus::Accepted);
    }

    #[test]
    fn test_amend_refused_for_draft() {
        let err = draft().amend().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_adjustments_only_in_draft() {
        let mut filing = draft();
        filing.add_deduction("D1", "equipment", 300).unwrap();
        filing.add_deduction("D2", "travel", 200).unwrap();
        filing.add_credit("C1", "solar", 150).unwrap();
        assert_eq!(filing.total_deductions(), 500);
        assert_eq!(filing.total_credits(), 150);

        assert!(matches!(
            filing.add_credit("C2", "", 0),
            Err(TreasuryError::InvalidAmount(0))
        ));

        filing.submit().unwrap();
        let err = filing.add_deduction("D3", "late", 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        let err = filing
            .update_amounts(FilingAmounts::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(filing.deductions.len(), 2);
    }

    #[test]
    fn test_update_amounts_rejects_negative() {
        let mut filing = draft();
        let err = filing
            .update_amounts(FilingAmounts {
                total_sales: -1,
                ..FilingAmounts::default()
            })
            .unwrap_err();
        assert!(matches!(err, TreasuryError::InvalidAmount(-1)));

        filing
            .update_amounts(FilingAmounts {
                total_sales: 10_000,
                taxable_amount: 8000,
                ..FilingAmounts::default()
            })
            .unwrap();
        assert_eq!(filing.taxable_amount, 8000);
    }

    #[test]
    fn test_payment_reconciliation_floors_at_zero() {
        let mut filing = draft();
        filing.record_payment(300).unwrap();
        filing.reverse_payment(500);
        assert_eq!(filing.tax_paid, 0);
    }

    #[test]
    fn test_balance_due() {
        let mut filing = draft();
        filing.add_credit("C1", "", 100).unwrap();
        filing.tax_calculated = 1000;
        filing.record_payment(400).unwrap();
        assert_eq!(filing.balance_due(), 500);

        filing.record_payment(900).unwrap();
        assert_eq!(filing.balance_due(), 0);
    }

    #[rstest]
    #[case(FilingStatus::Submitted, -1, true)]
    #[case(FilingStatus::Submitted, 1, false)]
    #[case(FilingStatus::Accepted, -1, false)]
    #[case(FilingStatus::Rejected, -1, true)]
    fn test_is_overdue_at(
        #[case] status: FilingStatus,
        #[case] days_from_due: i64,
        #[case] expected: bool,
    ) {
        let filing = with_status(status);
        let now = filing.due_date - Duration::days(days_from_due);
        assert_eq!(filing.is_overdue_at(now), expected);
    }
}
