//! Banking domain: customers, accounts and money movements.
//!
//! # Modules
//!
//! - `types` - Status and kind enums, service inputs
//! - `error` - Banking error types
//! - `customer`, `account`, `transaction` - Entities and their invariants
//! - `repository` - Storage seams
//! - `customer_service`, `account_service`, `transaction_service` - Orchestration

pub mod account;
pub mod account_service;
pub mod customer;
pub mod customer_service;
pub mod error;
pub mod repository;
pub mod transaction;
pub mod transaction_service;
pub mod types;

#[cfg(test)]
mod account_props;

pub use account::Account;
pub use account_service::AccountService;
pub use customer::Customer;
pub use customer_service::{CustomerService, CustomerUpdate};
pub use error::BankingError;
pub use repository::{
    AccountRepository, CustomerRepository, Movement, MovementRepository, TransactionRepository,
};
pub use transaction::Transaction;
pub use transaction_service::TransactionService;
pub use types::{
    AccountStatus, AccountType, CustomerStatus, NewAccount, NewCustomer, TransactionStatus,
    TransactionType,
};
