//! Treasury domain: tax rates, taxpayers, filings, payments and reporting.
//!
//! # Modules
//!
//! - `types` - Status and kind enums, service inputs
//! - `error` - Treasury error types
//! - `tax_rate`, `taxpayer`, `filing`, `payment` - Entities and their invariants
//! - `repository` - Storage seams
//! - `rate_service`, `taxpayer_service`, `filing_service`, `payment_service` - Orchestration
//! - `report` - Revenue, filing, compliance and per-type reports

pub mod error;
pub mod filing;
pub mod filing_service;
pub mod payment;
pub mod payment_service;
pub mod rate_service;
pub mod report;
pub mod repository;
pub mod tax_rate;
pub mod taxpayer;
pub mod taxpayer_service;
pub mod types;

#[cfg(test)]
mod tax_rate_props;

pub use error::TreasuryError;
pub use filing::{Adjustment, TaxFiling};
pub use filing_service::TaxFilingService;
pub use payment::TaxPayment;
pub use payment_service::TaxPaymentService;
pub use rate_service::TaxRateService;
pub use report::TaxReportService;
pub use repository::{
    TaxFilingRepository, TaxPaymentRepository, TaxRateRepository, TaxpayerRepository,
};
pub use tax_rate::TaxRate;
pub use taxpayer::Taxpayer;
pub use taxpayer_service::TaxpayerService;
pub use types::{
    BracketType, BusinessInfo, FilingAmounts, FilingPeriod, FilingStatus, NewTaxFiling,
    NewTaxPayment, NewTaxRate, NewTaxpayer, PaymentMethod, PaymentStatus, TaxRateStatus,
    TaxRateUpdate, TaxType, TaxpayerStatus, TaxpayerType,
};
