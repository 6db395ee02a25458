//! Banking repositories over [`MemoryStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tally_shared::types::{AccountId, CustomerId, TransactionId};

use super::MemoryStore;
use super::table::{Record, page};
use crate::banking::{
    Account, AccountRepository, Customer, CustomerRepository, Movement, MovementRepository,
    Transaction, TransactionRepository,
};
use crate::error::RepositoryError;

impl Record for Customer {
    type Id = CustomerId;
    const ENTITY: &'static str = "customer";

    fn id(&self) -> CustomerId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("email", self.email.clone())]
    }
}

impl Record for Account {
    type Id = AccountId;
    const ENTITY: &'static str = "account";

    fn id(&self) -> AccountId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("number", self.number.clone())]
    }

    fn version(&self) -> Option<i64> {
        Some(self.version)
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

impl Record for Transaction {
    type Id = TransactionId;
    const ENTITY: &'static str = "transaction";

    fn id(&self) -> TransactionId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("reference", self.reference.clone())]
    }

    fn version(&self) -> Option<i64> {
        Some(self.version)
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn get_by_id(&self, id: CustomerId) -> Result<Customer, RepositoryError> {
        self.customers.read().await.get(id)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.customers.read().await.find(|c| c.email == email))
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Customer>, RepositoryError> {
        Ok(page(self.customers.read().await.all(), limit, offset))
    }

    async fn create(&self, customer: &Customer) -> Result<(), RepositoryError> {
        self.customers.write().await.insert(customer)
    }

    async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        self.customers.write().await.update(customer)
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn get_by_id(&self, id: AccountId) -> Result<Account, RepositoryError> {
        self.accounts.read().await.get(id)
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Account>, RepositoryError> {
        Ok(page(self.accounts.read().await.all(), limit, offset))
    }

    async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Account>, RepositoryError> {
        Ok(self
            .accounts
            .read()
            .await
            .filter(|a| a.customer_id == customer_id))
    }

    async fn create(&self, account: &Account) -> Result<(), RepositoryError> {
        self.accounts.write().await.insert(account)
    }

    async fn update(&self, account: &Account) -> Result<Account, RepositoryError> {
        self.accounts.write().await.update(account)
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn get_by_id(&self, id: TransactionId) -> Result<Transaction, RepositoryError> {
        self.transactions.read().await.get(id)
    }

    async fn get_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Transaction>, RepositoryError> {
        Ok(self
            .transactions
            .read()
            .await
            .find(|t| t.reference == reference))
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Transaction>, RepositoryError> {
        Ok(page(self.transactions.read().await.all(), limit, offset))
    }

    async fn list_by_account(
        &self,
        account_id: AccountId,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let mut rows = self
            .transactions
            .read()
            .await
            .filter(|t| t.involves(account_id));
        rows.reverse();
        Ok(page(rows, limit, offset))
    }

    async fn create(&self, transaction: &Transaction) -> Result<(), RepositoryError> {
        self.transactions.write().await.insert(transaction)
    }

    async fn update(&self, transaction: &Transaction) -> Result<Transaction, RepositoryError> {
        self.transactions.write().await.update(transaction)
    }
}

#[async_trait]
impl MovementRepository for MemoryStore {
    async fn commit(&self, movement: &Movement) -> Result<Movement, RepositoryError> {
        // Lock order: accounts, then transactions.
        let mut accounts = self.accounts.write().await;
        let mut transactions = self.transactions.write().await;

        for account in &movement.accounts {
            accounts.check_update(account)?;
        }
        let tx = &movement.transaction;
        let tx_exists = transactions.contains(tx.id);
        if tx_exists {
            transactions.check_update(tx)?;
        } else {
            transactions.check_insert(tx)?;
        }

        let stored = movement
            .accounts
            .iter()
            .map(|account| accounts.apply_update(account))
            .collect();
        let transaction = if tx_exists {
            transactions.apply_update(tx)
        } else {
            transactions.insert(tx)?;
            tx.clone()
        };
        Ok(Movement {
            accounts: stored,
            transaction,
        })
    }
}
