//! In-memory repositories.
//!
//! [`MemoryStore`] implements every repository trait of the crate over
//! `tokio::sync::RwLock`-guarded tables. It is the default store of the
//! server (`memory://`) and the fixture for service tests.

mod banking;
mod table;
mod treasury;

use tokio::sync::RwLock;

use crate::banking::{Account, Customer, Transaction};
use crate::treasury::{TaxFiling, TaxPayment, TaxRate, Taxpayer};
use table::Table;

/// Process-local store backing all repositories.
#[derive(Default)]
pub struct MemoryStore {
    customers: RwLock<Table<Customer>>,
    accounts: RwLock<Table<Account>>,
    transactions: RwLock<Table<Transaction>>,
    tax_rates: RwLock<Table<TaxRate>>,
    taxpayers: RwLock<Table<Taxpayer>>,
    filings: RwLock<Table<TaxFiling>>,
    payments: RwLock<Table<TaxPayment>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
