//! Banking repositories over [`SeaStore`].

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::RepositoryError;
use tally_core::banking::{
    Account, AccountRepository, Customer, CustomerRepository, Movement, MovementRepository,
    Transaction, TransactionRepository,
};
use tally_shared::types::{AccountId, Address, CustomerId, TransactionId};

use super::{SeaStore, convert, decode, encode, parse, stale_or_missing, storage, write_err};
use crate::entities::{accounts, customers, transactions};

impl TryFrom<customers::Model> for Customer {
    type Error = RepositoryError;

    fn try_from(m: customers::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CustomerId::from_uuid(m.id),
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            phone_number: m.phone_number,
            address: Address {
                street: m.street,
                city: m.city,
                state: m.state,
                country: m.country,
                postal_code: m.postal_code,
            },
            status: parse(&m.status)?,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl From<&Customer> for customers::ActiveModel {
    fn from(c: &Customer) -> Self {
        Self {
            id: Set(c.id.into_inner()),
            first_name: Set(c.first_name.clone()),
            last_name: Set(c.last_name.clone()),
            email: Set(c.email.clone()),
            phone_number: Set(c.phone_number.clone()),
            street: Set(c.address.street.clone()),
            city: Set(c.address.city.clone()),
            state: Set(c.address.state.clone()),
            country: Set(c.address.country.clone()),
            postal_code: Set(c.address.postal_code.clone()),
            status: Set(c.status.as_str().to_string()),
            created_at: Set(c.created_at),
            updated_at: Set(c.updated_at),
        }
    }
}

impl TryFrom<accounts::Model> for Account {
    type Error = RepositoryError;

    fn try_from(m: accounts::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AccountId::from_uuid(m.id),
            customer_id: CustomerId::from_uuid(m.customer_id),
            account_type: parse(&m.account_type)?,
            status: parse(&m.status)?,
            balance: m.balance,
            currency: parse(&m.currency)?,
            name: m.name,
            number: m.number,
            version: m.version,
            created_at: m.created_at,
            updated_at: m.updated_at,
            closed_at: m.closed_at,
        })
    }
}

impl From<&Account> for accounts::ActiveModel {
    fn from(a: &Account) -> Self {
        Self {
            id: Set(a.id.into_inner()),
            customer_id: Set(a.customer_id.into_inner()),
            account_type: Set(a.account_type.as_str().to_string()),
            status: Set(a.status.as_str().to_string()),
            balance: Set(a.balance),
            currency: Set(a.currency.code().to_string()),
            name: Set(a.name.clone()),
            number: Set(a.number.clone()),
            version: Set(a.version),
            created_at: Set(a.created_at),
            updated_at: Set(a.updated_at),
            closed_at: Set(a.closed_at),
        }
    }
}

impl TryFrom<transactions::Model> for Transaction {
    type Error = RepositoryError;

    fn try_from(m: transactions::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TransactionId::from_uuid(m.id),
            transaction_type: parse(&m.transaction_type)?,
            status: parse(&m.status)?,
            account_id: AccountId::from_uuid(m.account_id),
            source_account_id: m.source_account_id.map(AccountId::from_uuid),
            target_account_id: m.target_account_id.map(AccountId::from_uuid),
            amount: m.amount,
            currency: parse(&m.currency)?,
            description: m.description,
            reference: m.reference,
            metadata: decode(&m.metadata)?,
            version: m.version,
            created_at: m.created_at,
            updated_at: m.updated_at,
            completed_at: m.completed_at,
        })
    }
}

fn transaction_model(t: &Transaction) -> Result<transactions::ActiveModel, RepositoryError> {
    Ok(transactions::ActiveModel {
        id: Set(t.id.into_inner()),
        transaction_type: Set(t.transaction_type.as_str().to_string()),
        status: Set(t.status.as_str().to_string()),
        account_id: Set(t.account_id.into_inner()),
        source_account_id: Set(t.source_account_id.map(AccountId::into_inner)),
        target_account_id: Set(t.target_account_id.map(AccountId::into_inner)),
        amount: Set(t.amount),
        currency: Set(t.currency.code().to_string()),
        description: Set(t.description.clone()),
        reference: Set(t.reference.clone()),
        metadata: Set(encode(&t.metadata)?),
        version: Set(t.version),
        created_at: Set(t.created_at),
        updated_at: Set(t.updated_at),
        completed_at: Set(t.completed_at),
    })
}

/// Version-guarded account update, usable inside a database transaction.
async fn update_account<C: ConnectionTrait>(
    conn: &C,
    account: &Account,
) -> Result<Account, RepositoryError> {
    let mut stored = account.clone();
    stored.version += 1;

    let result = accounts::Entity::update_many()
        .set(accounts::ActiveModel::from(&stored))
        .filter(accounts::Column::Id.eq(account.id.into_inner()))
        .filter(accounts::Column::Version.eq(account.version))
        .exec(conn)
        .await
        .map_err(|e| write_err(e, "account", "number", &account.number))?;

    if result.rows_affected == 0 {
        let exists = accounts::Entity::find_by_id(account.id.into_inner())
            .one(conn)
            .await
            .map_err(storage)?
            .is_some();
        return Err(stale_or_missing(exists, "account", account.id));
    }
    Ok(stored)
}

async fn insert_transaction<C: ConnectionTrait>(
    conn: &C,
    transaction: &Transaction,
) -> Result<(), RepositoryError> {
    transaction_model(transaction)?
        .insert(conn)
        .await
        .map_err(|e| write_err(e, "transaction", "reference", &transaction.reference))?;
    Ok(())
}

/// Version-guarded transaction update, usable inside a database transaction.
async fn update_transaction<C: ConnectionTrait>(
    conn: &C,
    transaction: &Transaction,
) -> Result<Transaction, RepositoryError> {
    let mut stored = transaction.clone();
    stored.version += 1;

    let result = transactions::Entity::update_many()
        .set(transaction_model(&stored)?)
        .filter(transactions::Column::Id.eq(transaction.id.into_inner()))
        .filter(transactions::Column::Version.eq(transaction.version))
        .exec(conn)
        .await
        .map_err(|e| write_err(e, "transaction", "reference", &transaction.reference))?;

    if result.rows_affected == 0 {
        let exists = transactions::Entity::find_by_id(transaction.id.into_inner())
            .one(conn)
            .await
            .map_err(storage)?
            .is_some();
        return Err(stale_or_missing(exists, "transaction", transaction.id));
    }
    Ok(stored)
}

#[async_trait]
impl CustomerRepository for SeaStore {
    async fn get_by_id(&self, id: CustomerId) -> Result<Customer, RepositoryError> {
        customers::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("customer", id))?
            .try_into()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Customer>, RepositoryError> {
        customers::Entity::find()
            .filter(customers::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(Customer::try_from)
            .transpose()
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Customer>, RepositoryError> {
        let rows = customers::Entity::find()
            .order_by_asc(customers::Column::CreatedAt)
            .order_by_asc(customers::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(storage)?;
        convert(rows)
    }

    async fn create(&self, customer: &Customer) -> Result<(), RepositoryError> {
        customers::ActiveModel::from(customer)
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "customer", "email", &customer.email))?;
        Ok(())
    }

    async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        let result = customers::Entity::update_many()
            .set(customers::ActiveModel::from(customer))
            .filter(customers::Column::Id.eq(customer.id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(|e| write_err(e, "customer", "email", &customer.email))?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("customer", customer.id));
        }
        Ok(customer.clone())
    }
}

#[async_trait]
impl AccountRepository for SeaStore {
    async fn get_by_id(&self, id: AccountId) -> Result<Account, RepositoryError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("account", id))?
            .try_into()
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Account>, RepositoryError> {
        let rows = accounts::Entity::find()
            .order_by_asc(accounts::Column::CreatedAt)
            .order_by_asc(accounts::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(storage)?;
        convert(rows)
    }

    async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Account>, RepositoryError> {
        let rows = accounts::Entity::find()
            .filter(accounts::Column::CustomerId.eq(customer_id.into_inner()))
            .order_by_asc(accounts::Column::CreatedAt)
            .order_by_asc(accounts::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?;
        convert(rows)
    }

    async fn create(&self, account: &Account) -> Result<(), RepositoryError> {
        accounts::ActiveModel::from(account)
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "account", "number", &account.number))?;
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<Account, RepositoryError> {
        update_account(&self.db, account).await
    }
}

#[async_trait]
impl TransactionRepository for SeaStore {
    async fn get_by_id(&self, id: TransactionId) -> Result<Transaction, RepositoryError> {
        transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("transaction", id))?
            .try_into()
    }

    async fn get_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Transaction>, RepositoryError> {
        transactions::Entity::find()
            .filter(transactions::Column::Reference.eq(reference))
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(Transaction::try_from)
            .transpose()
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = transactions::Entity::find()
            .order_by_asc(transactions::Column::CreatedAt)
            .order_by_asc(transactions::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(storage)?;
        convert(rows)
    }

    async fn list_by_account(
        &self,
        account_id: AccountId,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let id = account_id.into_inner();
        let rows = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::AccountId.eq(id))
                    .add(transactions::Column::SourceAccountId.eq(id))
                    .add(transactions::Column::TargetAccountId.eq(id)),
            )
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(storage)?;
        convert(rows)
    }

    async fn create(&self, transaction: &Transaction) -> Result<(), RepositoryError> {
        insert_transaction(&self.db, transaction).await
    }

    async fn update(&self, transaction: &Transaction) -> Result<Transaction, RepositoryError> {
        update_transaction(&self.db, transaction).await
    }
}

#[async_trait]
impl MovementRepository for SeaStore {
    async fn commit(&self, movement: &Movement) -> Result<Movement, RepositoryError> {
        // Dropping the transaction on an early return rolls it back.
        let txn = self.db.begin().await.map_err(storage)?;

        let mut stored = Vec::with_capacity(movement.accounts.len());
        for account in &movement.accounts {
            stored.push(update_account(&txn, account).await?);
        }

        let tx = &movement.transaction;
        let exists = transactions::Entity::find_by_id(tx.id.into_inner())
            .one(&txn)
            .await
            .map_err(storage)?
            .is_some();
        let transaction = if exists {
            update_transaction(&txn, tx).await?
        } else {
            insert_transaction(&txn, tx).await?;
            tx.clone()
        };

        txn.commit().await.map_err(storage)?;
        Ok(Movement {
            accounts: stored,
            transaction,
        })
    }
}
