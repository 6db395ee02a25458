//! `SeaORM` entities, one module per table.
//!
//! Enums are stored as their lower-case string forms. Deductions, credits,
//! exemption codes and metadata are stored as JSON text.

pub mod accounts;
pub mod customers;
pub mod tax_filings;
pub mod tax_payments;
pub mod tax_rates;
pub mod taxpayers;
pub mod transactions;
