//! Transaction entity: the record of one money movement.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, Currency, MinorUnits, TransactionId};

use crate::banking::error::BankingError;
use crate::banking::types::{TransactionStatus, TransactionType};
use crate::codes::prefixed_code;

/// A money movement against one or two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier.
    pub id: TransactionId,
    /// Kind of movement.
    pub transaction_type: TransactionType,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Primary account (the source for transfers).
    pub account_id: AccountId,
    /// Debited account of a transfer.
    pub source_account_id: Option<AccountId>,
    /// Credited account of a transfer.
    pub target_account_id: Option<AccountId>,
    /// Amount in minor units, fixed at creation.
    pub amount: MinorUnits,
    /// Currency of the amount.
    pub currency: Currency,
    /// Free text description.
    pub description: String,
    /// Unique reference code, e.g. `TX-1a2b3c4d`.
    pub reference: String,
    /// Arbitrary key/value annotations.
    pub metadata: BTreeMap<String, String>,
    /// Optimistic concurrency token, bumped by every stored update.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Set when the transaction completes.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Creates a pending single-account transaction.
    #[must_use]
    pub fn new(
        transaction_type: TransactionType,
        account_id: AccountId,
        amount: MinorUnits,
        currency: Currency,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            transaction_type,
            status: TransactionStatus::Pending,
            account_id,
            source_account_id: None,
            target_account_id: None,
            amount,
            currency,
            description: description.into(),
            reference: prefixed_code("TX"),
            metadata: BTreeMap::new(),
            version: 1,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Creates a pending transfer referencing both accounts.
    #[must_use]
    pub fn new_transfer(
        source: AccountId,
        target: AccountId,
        amount: MinorUnits,
        currency: Currency,
        description: impl Into<String>,
    ) -> Self {
        let mut tx = Self::new(
            TransactionType::Transfer,
            source,
            amount,
            currency,
            description,
        );
        tx.source_account_id = Some(source);
        tx.target_account_id = Some(target);
        tx
    }

    /// Returns true if the transaction touches `account_id` in any role.
    #[must_use]
    pub fn involves(&self, account_id: AccountId) -> bool {
        self.account_id == account_id
            || self.source_account_id == Some(account_id)
            || self.target_account_id == Some(account_id)
    }

    /// Marks the transaction completed.
    pub fn complete(&mut self) -> Result<(), BankingError> {
        self.ensure_pending()?;
        let now = Utc::now();
        self.status = TransactionStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Marks the transaction failed.
    pub fn fail(&mut self) -> Result<(), BankingError> {
        self.ensure_pending()?;
        self.status = TransactionStatus::Failed;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Cancels a pending transaction.
    pub fn reverse(&mut self) -> Result<(), BankingError> {
        self.ensure_pending()?;
        self.status = TransactionStatus::Reversed;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Sets a metadata entry, replacing any previous value.
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
        self.updated_at = Utc::now();
    }

    fn ensure_pending(&self) -> Result<(), BankingError> {
        if self.status.is_terminal() {
            return Err(BankingError::InvalidTransactionStatus {
                reference: self.reference.clone(),
                status: self.status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit(amount: MinorUnits) -> Transaction {
        Transaction::new(
            TransactionType::Deposit,
            AccountId::new(),
            amount,
            Currency::Usd,
            "payroll",
        )
    }

    #[test]
    fn test_new_transaction_is_pending() {
        let tx = deposit(500);
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(tx.reference.starts_with("TX-"));
        assert_eq!(tx.reference.len(), 11);
        assert!(tx.completed_at.is_none());
        assert!(tx.source_account_id.is_none());
    }

    #[test]
    fn test_transfer_references_both_accounts() {
        let source = AccountId::new();
        let target = AccountId::new();
        let tx = Transaction::new_transfer(source, target, 40, Currency::Usd, "rent");

        assert_eq!(tx.transaction_type, TransactionType::Transfer);
        assert_eq!(tx.account_id, source);
        assert_eq!(tx.source_account_id, Some(source));
        assert_eq!(tx.target_account_id, Some(target));
        assert!(tx.involves(source));
        assert!(tx.involves(target));
        assert!(!tx.involves(AccountId::new()));
    }

    #[test]
    fn test_complete_sets_completed_at() {
        let mut tx = deposit(500);
        tx.complete().unwrap();
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert!(tx.completed_at.is_some());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut tx = deposit(500);
        tx.fail().unwrap();

        assert!(matches!(
            tx.complete(),
            Err(BankingError::InvalidTransactionStatus {
                status: TransactionStatus::Failed,
                ..
            })
        ));
        assert!(tx.reverse().is_err());
        assert!(tx.fail().is_err());
        assert_eq!(tx.status, TransactionStatus::Failed);
    }

    #[test]
    fn test_reverse_pending() {
        let mut tx = deposit(500);
        tx.reverse().unwrap();
        assert_eq!(tx.status, TransactionStatus::Reversed);
        assert!(tx.completed_at.is_none());
    }

    #[test]
    fn test_add_metadata() {
        let mut tx = deposit(500);
        tx.add_metadata("channel", "atm");
        tx.add_metadata("channel", "branch");
        assert_eq!(tx.metadata.len(), 1);
        assert_eq!(tx.metadata["channel"], "branch");
    }
}
