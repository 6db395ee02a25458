//! Report data types.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{MinorUnits, TaxpayerId};

use crate::treasury::types::{FilingStatus, TaxType, TaxpayerType};

/// Completed tax revenue over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueReport {
    /// First value date included.
    pub start_date: NaiveDate,
    /// Last value date included.
    pub end_date: NaiveDate,
    /// Sum of every completed payment in range.
    pub total_revenue: MinorUnits,
    /// Revenue per tax type; every type is present.
    pub revenue_by_type: BTreeMap<TaxType, MinorUnits>,
    /// Revenue per calendar month, oldest first, months without revenue
    /// omitted.
    pub monthly_revenue: Vec<MonthlyRevenue>,
    /// Largest contributors, highest first.
    pub top_taxpayers: Vec<TaxpayerRevenue>,
    /// When the report was built.
    pub generated_at: DateTime<Utc>,
}

/// Revenue of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    /// Calendar year.
    pub year: i32,
    /// Month, 1 to 12.
    pub month: u32,
    /// Revenue in minor units.
    pub revenue: MinorUnits,
}

/// Revenue contributed by one taxpayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxpayerRevenue {
    /// The taxpayer.
    pub taxpayer_id: TaxpayerId,
    /// Legal name, empty if the taxpayer record is gone.
    pub taxpayer_name: String,
    /// Revenue in minor units.
    pub revenue: MinorUnits,
}

/// Filing counts for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingStatusReport {
    /// Tax year.
    pub tax_year: i32,
    /// Number of filings.
    pub total_filings: usize,
    /// Count per status; statuses without filings are omitted.
    pub filings_by_status: BTreeMap<FilingStatus, usize>,
    /// Count per tax type; types without filings are omitted.
    pub filings_by_type: BTreeMap<TaxType, usize>,
    /// Filings past due and not accepted.
    pub overdue_filings: usize,
    /// When the report was built.
    pub generated_at: DateTime<Utc>,
}

/// Standing of the taxpayer base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxpayerComplianceReport {
    /// Number of taxpayers.
    pub total_taxpayers: usize,
    /// Taxpayers not delinquent.
    pub compliant_taxpayers: usize,
    /// Delinquent taxpayers.
    pub delinquent_taxpayers: usize,
    /// Percentage of compliant taxpayers per type, two decimal places.
    pub compliance_by_type: BTreeMap<TaxpayerType, Decimal>,
    /// When the report was built.
    pub generated_at: DateTime<Utc>,
}

/// Revenue and activity split by tax type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxTypeBreakdownReport {
    /// First value date included.
    pub start_date: NaiveDate,
    /// Last value date included.
    pub end_date: NaiveDate,
    /// Sum of every completed payment in range.
    pub total_revenue: MinorUnits,
    /// Breakdown per tax type; every type is present.
    pub breakdown_by_type: BTreeMap<TaxType, TaxBreakdown>,
    /// When the report was built.
    pub generated_at: DateTime<Utc>,
}

/// Activity of one tax type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Completed revenue in minor units.
    pub revenue: MinorUnits,
    /// Share of total revenue in percent, two decimal places.
    pub percentage: Decimal,
    /// Filings whose period overlaps the range.
    pub filings_count: usize,
    /// Completed payments in range.
    pub payments_count: usize,
}
