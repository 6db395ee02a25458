//! Common types used across the application.

pub mod address;
pub mod id;
pub mod money;
pub mod pagination;

pub use address::Address;
pub use id::*;
pub use money::{Currency, MinorUnits, Money, MoneyError};
pub use pagination::{PageMeta, PageRequest, PageResponse};
