//! Transaction service: history queries and single-account movements.

use std::sync::Arc;

use tally_shared::types::{AccountId, MinorUnits, TransactionId};

use crate::banking::account::ensure_positive;
use crate::banking::error::BankingError;
use crate::banking::repository::{
    AccountRepository, Movement, MovementRepository, TransactionRepository,
};
use crate::banking::transaction::Transaction;
use crate::banking::types::TransactionType;
use crate::codes::{CODE_ATTEMPTS, collides_on, prefixed_code};
use crate::error::RepositoryError;

/// Records and queries transactions.
#[derive(Clone)]
pub struct TransactionService {
    transactions: Arc<dyn TransactionRepository>,
    accounts: Arc<dyn AccountRepository>,
    movements: Arc<dyn MovementRepository>,
}

impl TransactionService {
    /// Creates a new transaction service.
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        accounts: Arc<dyn AccountRepository>,
        movements: Arc<dyn MovementRepository>,
    ) -> Self {
        Self {
            transactions,
            accounts,
            movements,
        }
    }

    /// Loads a transaction.
    pub async fn get(&self, id: TransactionId) -> Result<Transaction, BankingError> {
        Ok(self.transactions.get_by_id(id).await?)
    }

    /// Finds a transaction by its reference code.
    pub async fn get_by_reference(&self, reference: &str) -> Result<Transaction, BankingError> {
        self.transactions
            .get_by_reference(reference)
            .await?
            .ok_or_else(|| RepositoryError::not_found("transaction", reference).into())
    }

    /// Lists transactions, oldest first.
    pub async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Transaction>, BankingError> {
        Ok(self.transactions.list(limit, offset).await?)
    }

    /// Lists the history of one account, newest first.
    pub async fn list_by_account(
        &self,
        account_id: AccountId,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Transaction>, BankingError> {
        // Surface NotFound for unknown accounts instead of an empty page.
        self.accounts.get_by_id(account_id).await?;
        Ok(self
            .transactions
            .list_by_account(account_id, limit, offset)
            .await?)
    }

    /// Records a pending transaction, applies it to the account and commits
    /// both. If the account refuses the movement, or the commit fails, the
    /// stored transaction is marked failed and the error returned.
    ///
    /// Deposits and interest credit the account; withdrawals and fees debit
    /// it. Transfers go through `AccountService::transfer`.
    pub async fn create_transaction(
        &self,
        transaction_type: TransactionType,
        account_id: AccountId,
        amount: MinorUnits,
        description: &str,
    ) -> Result<Transaction, BankingError> {
        let credit = match transaction_type {
            TransactionType::Deposit | TransactionType::Interest => true,
            TransactionType::Withdrawal | TransactionType::Fee => false,
            TransactionType::Transfer => {
                return Err(BankingError::InvalidInput(
                    "transfers must name a source and a target account".into(),
                ));
            }
        };
        ensure_positive(amount)?;

        let mut account = self.accounts.get_by_id(account_id).await?;
        let mut pending = Transaction::new(
            transaction_type,
            account_id,
            amount,
            account.currency,
            description,
        );
        let mut attempt = 1;
        loop {
            match self.transactions.create(&pending).await {
                Ok(()) => break,
                Err(err) if attempt < CODE_ATTEMPTS && collides_on(&err, "reference") => {
                    tracing::warn!(reference = %pending.reference, "reference already taken, regenerating");
                    pending.reference = prefixed_code("TX");
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        let applied = if credit {
            account.deposit(amount)
        } else {
            account.withdraw(amount)
        };
        if let Err(err) = applied {
            self.mark_failed(pending).await;
            return Err(err);
        }

        let mut completed = pending.clone();
        completed.complete()?;
        let movement = Movement {
            accounts: vec![account],
            transaction: completed,
        };
        let stored = match self.movements.commit(&movement).await {
            Ok(stored) => stored.transaction,
            Err(err) => {
                tracing::error!(
                    reference = %pending.reference,
                    error = %err,
                    "failed to commit transaction"
                );
                self.mark_failed(pending).await;
                return Err(err.into());
            }
        };

        tracing::info!(
            reference = %stored.reference,
            transaction_type = %transaction_type,
            account_id = %account_id,
            amount,
            "transaction completed"
        );
        Ok(stored)
    }

    /// Cancels a pending transaction. Balances are untouched because a
    /// pending transaction has not been applied.
    pub async fn reverse_transaction(&self, id: TransactionId) -> Result<Transaction, BankingError> {
        let mut tx = self.transactions.get_by_id(id).await?;
        tx.reverse()?;
        let tx = self.transactions.update(&tx).await?;
        tracing::info!(reference = %tx.reference, "transaction reversed");
        Ok(tx)
    }

    async fn mark_failed(&self, mut tx: Transaction) {
        if tx.fail().is_err() {
            return;
        }
        if let Err(err) = self.transactions.update(&tx).await {
            tracing::error!(
                reference = %tx.reference,
                error = %err,
                "failed to mark transaction as failed"
            );
        }
    }
}
