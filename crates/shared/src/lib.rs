//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Money in integer minor units
//! - Typed IDs for type-safe entity references
//! - Postal addresses and pagination types
//! - Application-wide error types
//! - Configuration management

#[macro_use]
mod macros;

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
