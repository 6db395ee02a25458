//! Storage seams for the banking domain.
//!
//! Implementations live in `crate::store` (in-memory) and in `tally-db`
//! (SeaORM). Every list is ordered by creation time so paging is stable.

use async_trait::async_trait;
use tally_shared::types::{AccountId, CustomerId, TransactionId};

use crate::banking::account::Account;
use crate::banking::customer::Customer;
use crate::banking::transaction::Transaction;
use crate::error::RepositoryError;

/// Customer persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Loads a customer.
    async fn get_by_id(&self, id: CustomerId) -> Result<Customer, RepositoryError>;

    /// Finds the customer owning `email`, if any.
    async fn get_by_email(&self, email: &str) -> Result<Option<Customer>, RepositoryError>;

    /// Lists customers.
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Customer>, RepositoryError>;

    /// Inserts a customer. Fails with `Duplicate` on a taken email.
    async fn create(&self, customer: &Customer) -> Result<(), RepositoryError>;

    /// Replaces a stored customer.
    async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError>;
}

/// Account persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Loads an account.
    async fn get_by_id(&self, id: AccountId) -> Result<Account, RepositoryError>;

    /// Lists accounts.
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Account>, RepositoryError>;

    /// Lists every account of a customer.
    async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Account>, RepositoryError>;

    /// Inserts an account. Fails with `Duplicate` on a taken account number.
    async fn create(&self, account: &Account) -> Result<(), RepositoryError>;

    /// Replaces a stored account if its version still matches, returning the
    /// stored copy with the bumped version.
    async fn update(&self, account: &Account) -> Result<Account, RepositoryError>;
}

/// Transaction persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Loads a transaction.
    async fn get_by_id(&self, id: TransactionId) -> Result<Transaction, RepositoryError>;

    /// Finds a transaction by reference code.
    async fn get_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Transaction>, RepositoryError>;

    /// Lists transactions, oldest first.
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Transaction>, RepositoryError>;

    /// Lists transactions touching an account in any role, newest first.
    async fn list_by_account(
        &self,
        account_id: AccountId,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Transaction>, RepositoryError>;

    /// Inserts a transaction. Fails with `Duplicate` on a taken reference.
    async fn create(&self, transaction: &Transaction) -> Result<(), RepositoryError>;

    /// Replaces a stored transaction.
    async fn update(&self, transaction: &Transaction) -> Result<Transaction, RepositoryError>;
}

/// One balance-affecting unit of work: the mutated accounts plus the
/// transaction that records the movement.
#[derive(Debug, Clone)]
pub struct Movement {
    /// Accounts whose balances changed, as loaded and then mutated.
    pub accounts: Vec<Account>,
    /// The transaction to insert (or replace, if already stored).
    pub transaction: Transaction,
}

/// Atomic persistence of a [`Movement`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovementRepository: Send + Sync {
    /// Writes every account and the transaction, or nothing.
    ///
    /// Fails with `Conflict` if any account changed since it was loaded,
    /// or if the transaction is already stored at a different version.
    /// Returns the movement as stored, accounts in input order.
    async fn commit(&self, movement: &Movement) -> Result<Movement, RepositoryError>;
}
