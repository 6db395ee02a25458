//! Treasury reporting.
//!
//! [`TaxReports`] builds reports from records already in memory;
//! [`TaxReportService`] loads those records from the repositories.

pub mod builder;
pub mod service;
pub mod types;

#[cfg(test)]
mod props;

pub use builder::TaxReports;
pub use service::TaxReportService;
pub use types::*;
