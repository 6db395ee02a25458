//! Account service: opening accounts and moving money.
//!
//! Deposit, withdraw and transfer mutate the loaded accounts in memory and
//! then persist the accounts together with the completed transaction through
//! one [`MovementRepository::commit`]. Nothing is written unless every check
//! passes, and the commit itself is all-or-nothing, so a failure anywhere
//! leaves stored balances untouched.

use std::sync::Arc;

use tally_shared::types::{AccountId, CustomerId, MinorUnits};

use crate::banking::account::{Account, ensure_positive};
use crate::banking::error::BankingError;
use crate::banking::repository::{
    AccountRepository, CustomerRepository, Movement, MovementRepository,
};
use crate::banking::transaction::Transaction;
use crate::banking::types::{NewAccount, TransactionType};
use crate::codes::{CODE_ATTEMPTS, collides_on, prefixed_code, short_code};
use crate::error::ErrorKind;

/// Orchestrates account lifecycle and balance movements.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    customers: Arc<dyn CustomerRepository>,
    movements: Arc<dyn MovementRepository>,
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        customers: Arc<dyn CustomerRepository>,
        movements: Arc<dyn MovementRepository>,
    ) -> Self {
        Self {
            accounts,
            customers,
            movements,
        }
    }

    /// Loads an account.
    pub async fn get(&self, id: AccountId) -> Result<Account, BankingError> {
        Ok(self.accounts.get_by_id(id).await?)
    }

    /// Lists accounts.
    pub async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Account>, BankingError> {
        Ok(self.accounts.list(limit, offset).await?)
    }

    /// Lists the accounts of one customer.
    pub async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Account>, BankingError> {
        Ok(self.accounts.list_by_customer(customer_id).await?)
    }

    /// Opens an account for an existing, active customer.
    pub async fn create(&self, input: NewAccount) -> Result<Account, BankingError> {
        if input.name.trim().is_empty() {
            return Err(BankingError::InvalidInput(
                "account name must not be empty".into(),
            ));
        }

        let customer = self.customers.get_by_id(input.customer_id).await?;
        if !customer.is_active() {
            return Err(BankingError::CustomerInactive(customer.id));
        }

        let mut account = Account::new(input);
        let mut attempt = 1;
        loop {
            match self.accounts.create(&account).await {
                Ok(()) => break,
                Err(err) if attempt < CODE_ATTEMPTS && collides_on(&err, "number") => {
                    tracing::warn!(number = %account.number, "account number already taken, regenerating");
                    account.number = short_code();
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        tracing::info!(
            account_id = %account.id,
            customer_id = %account.customer_id,
            account_type = %account.account_type,
            "account opened"
        );
        Ok(account)
    }

    /// Renames an active account.
    pub async fn rename(&self, id: AccountId, name: &str) -> Result<Account, BankingError> {
        let mut account = self.accounts.get_by_id(id).await?;
        account.rename(name)?;
        Ok(self.accounts.update(&account).await?)
    }

    /// Closes an active account.
    pub async fn close(&self, id: AccountId) -> Result<Account, BankingError> {
        let mut account = self.accounts.get_by_id(id).await?;
        account.close()?;
        let account = self.accounts.update(&account).await?;
        tracing::info!(account_id = %id, "account closed");
        Ok(account)
    }

    /// Freezes an active account.
    pub async fn deactivate(&self, id: AccountId) -> Result<Account, BankingError> {
        let mut account = self.accounts.get_by_id(id).await?;
        account.deactivate()?;
        Ok(self.accounts.update(&account).await?)
    }

    /// Unfreezes an inactive account.
    pub async fn reactivate(&self, id: AccountId) -> Result<Account, BankingError> {
        let mut account = self.accounts.get_by_id(id).await?;
        account.reactivate()?;
        Ok(self.accounts.update(&account).await?)
    }

    /// Credits an account and records a completed deposit.
    pub async fn deposit(
        &self,
        account_id: AccountId,
        amount: MinorUnits,
        description: &str,
    ) -> Result<Transaction, BankingError> {
        ensure_positive(amount)?;
        let mut account = self.accounts.get_by_id(account_id).await?;
        account.deposit(amount)?;

        let mut tx = Transaction::new(
            TransactionType::Deposit,
            account_id,
            amount,
            account.currency,
            description,
        );
        tx.complete()?;

        self.commit(vec![account], tx).await
    }

    /// Debits an account and records a completed withdrawal.
    pub async fn withdraw(
        &self,
        account_id: AccountId,
        amount: MinorUnits,
        description: &str,
    ) -> Result<Transaction, BankingError> {
        ensure_positive(amount)?;
        let mut account = self.accounts.get_by_id(account_id).await?;
        account.withdraw(amount)?;

        let mut tx = Transaction::new(
            TransactionType::Withdrawal,
            account_id,
            amount,
            account.currency,
            description,
        );
        tx.complete()?;

        self.commit(vec![account], tx).await
    }

    /// Moves `amount` from `source_id` to `target_id` as one transfer
    /// transaction referencing both accounts.
    pub async fn transfer(
        &self,
        source_id: AccountId,
        target_id: AccountId,
        amount: MinorUnits,
        description: &str,
    ) -> Result<Transaction, BankingError> {
        ensure_positive(amount)?;
        if source_id == target_id {
            return Err(BankingError::SameAccount);
        }

        let mut source = self.accounts.get_by_id(source_id).await?;
        let mut target = self.accounts.get_by_id(target_id).await?;

        if !source.is_active() {
            return Err(BankingError::AccountClosed(source_id));
        }
        if !target.is_active() {
            return Err(BankingError::AccountClosed(target_id));
        }
        if source.currency != target.currency {
            return Err(BankingError::CurrencyMismatch {
                from_currency: source.currency,
                to_currency: target.currency,
            });
        }

        source.withdraw(amount)?;
        target.deposit(amount)?;

        let mut tx =
            Transaction::new_transfer(source_id, target_id, amount, source.currency, description);
        tx.complete()?;

        self.commit(vec![source, target], tx).await
    }

    async fn commit(
        &self,
        accounts: Vec<Account>,
        transaction: Transaction,
    ) -> Result<Transaction, BankingError> {
        let mut movement = Movement {
            accounts,
            transaction,
        };

        let mut attempt = 1;
        let tx = loop {
            match self.movements.commit(&movement).await {
                Ok(stored) => break stored.transaction,
                // A failed commit writes nothing, so the same accounts can go again.
                Err(err) if attempt < CODE_ATTEMPTS && collides_on(&err, "reference") => {
                    tracing::warn!(
                        reference = %movement.transaction.reference,
                        "reference already taken, regenerating"
                    );
                    movement.transaction.reference = prefixed_code("TX");
                    attempt += 1;
                }
                Err(err) => {
                    if err.kind() == ErrorKind::Storage {
                        tracing::error!(
                            reference = %movement.transaction.reference,
                            error = %err,
                            "failed to commit movement"
                        );
                    }
                    return Err(err.into());
                }
            }
        };

        tracing::info!(
            reference = %tx.reference,
            transaction_type = %tx.transaction_type,
            account_id = %tx.account_id,
            amount = tx.amount,
            "movement committed"
        );
        Ok(tx)
    }
}
