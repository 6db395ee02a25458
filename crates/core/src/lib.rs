//! Core business logic for Tally.
//!
//! This crate contains the banking and treasury domains with ZERO web or
//! database dependencies. Entities enforce their own invariants, services
//! orchestrate them over async repository traits, and [`store::MemoryStore`]
//! implements every repository in process.
//!
//! # Modules
//!
//! - `banking` - Customers, accounts and money movements
//! - `treasury` - Tax rates, taxpayers, filings, payments and reports
//! - `error` - Error kinds and repository errors
//! - `store` - In-memory repositories
//! - `services` - Repository and service bundles

pub mod banking;
mod codes;
pub mod error;
pub mod services;
pub mod store;
pub mod treasury;

pub use error::{ErrorKind, RepositoryError};
pub use services::{Repositories, Services};
