//! Treasury enums and service inputs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tally_shared::types::{Address, MinorUnits, TaxFilingId, TaxpayerId};

tally_shared::string_enum! {
    /// Kind of tax.
    pub enum TaxType {
        /// Personal or corporate income tax.
        Income => "income",
        /// Sales tax.
        Sales => "sales",
        /// Property tax.
        Property => "property",
        /// Business tax.
        Business => "business",
        /// Excise duty.
        Excise => "excise",
    }
}

tally_shared::string_enum! {
    /// Tax rate lifecycle status.
    ///
    /// Valid transitions:
    /// - Proposed → Active (activate)
    /// - Active → Inactive (deactivate)
    /// - Inactive → Active (activate)
    /// - any non-archived → Archived (archive, terminal)
    pub enum TaxRateStatus {
        /// In force.
        Active => "active",
        /// Suspended.
        Inactive => "inactive",
        /// Drafted, not yet in force.
        Proposed => "proposed",
        /// Retired permanently.
        Archived => "archived",
    }
}

tally_shared::string_enum! {
    /// How a rate is applied to an amount.
    pub enum BracketType {
        /// Same rate for the whole amount.
        Flat => "flat",
        /// Rate applies to the slice of the amount between min and max.
        Progressive => "progressive",
        /// Rate applies to the whole amount when it falls inside the tier.
        Tiered => "tiered",
    }
}

tally_shared::string_enum! {
    /// Tax filing lifecycle status.
    ///
    /// Valid transitions:
    /// - Draft → Submitted (submit)
    /// - Submitted → Processing (process)
    /// - Submitted | Processing → Accepted (accept)
    /// - Submitted | Processing → Rejected (reject)
    ///
    /// `Amended` labels a new filing produced by amend. `Audited` is set by
    /// external review only.
    pub enum FilingStatus {
        /// Being prepared; amounts are editable.
        Draft => "draft",
        /// Handed in.
        Submitted => "submitted",
        /// Under assessment.
        Processing => "processing",
        /// Assessment complete.
        Accepted => "accepted",
        /// Sent back.
        Rejected => "rejected",
        /// Correction of an earlier filing.
        Amended => "amended",
        /// Under audit.
        Audited => "audited",
    }
}

tally_shared::string_enum! {
    /// Period covered by a filing.
    pub enum FilingPeriod {
        /// One month.
        Monthly => "monthly",
        /// Three months.
        Quarterly => "quarterly",
        /// Six months.
        SemiAnnual => "semi_annual",
        /// One year.
        Annual => "annual",
    }
}

tally_shared::string_enum! {
    /// How a tax payment was made.
    pub enum PaymentMethod {
        /// Electronic funds transfer.
        Electronic => "electronic",
        /// Paper check.
        Check => "check",
        /// Credit card.
        Credit => "credit",
        /// Debit card.
        Debit => "debit",
        /// Cash at a counter.
        Cash => "cash",
        /// Wire transfer.
        Wire => "wire",
    }
}

tally_shared::string_enum! {
    /// Tax payment lifecycle status.
    ///
    /// Valid transitions:
    /// - Pending → Completed | Failed | Voided
    /// - Completed → Refunded
    pub enum PaymentStatus {
        /// Awaiting settlement.
        Pending => "pending",
        /// Settled.
        Completed => "completed",
        /// Settlement failed.
        Failed => "failed",
        /// Returned to the taxpayer.
        Refunded => "refunded",
        /// Cancelled before settlement.
        Voided => "voided",
    }
}

tally_shared::string_enum! {
    /// Kind of taxpayer.
    pub enum TaxpayerType {
        /// A person.
        Individual => "individual",
        /// A company.
        Business => "business",
        /// A charity or foundation.
        NonProfit => "non_profit",
        /// A public body.
        Government => "government",
    }
}

tally_shared::string_enum! {
    /// Taxpayer standing.
    pub enum TaxpayerStatus {
        /// In good standing.
        Active => "active",
        /// Dormant.
        Inactive => "inactive",
        /// Exempt from taxation.
        Exempt => "exempt",
        /// Behind on obligations.
        Delinquent => "delinquent",
    }
}

/// Input for creating a tax rate.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTaxRate {
    /// Kind of tax.
    pub tax_type: TaxType,
    /// Display name.
    pub name: String,
    /// Free text description.
    #[serde(default)]
    pub description: String,
    /// Rate as a fraction, 0.0 to 1.0 inclusive.
    pub rate: f64,
    /// Bracket type.
    pub bracket_type: BracketType,
    /// Lower bound of the band, if any.
    #[serde(default)]
    pub min_amount: Option<MinorUnits>,
    /// Upper bound of the band, if any.
    #[serde(default)]
    pub max_amount: Option<MinorUnits>,
    /// Optional category (e.g. "luxury" for sales tax).
    #[serde(default)]
    pub category: Option<String>,
    /// Geographic jurisdiction code.
    pub jurisdiction_code: String,
    /// First day the rate is in force.
    pub effective_date: NaiveDate,
    /// Last day the rate is in force.
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
}

/// Replacement values for an existing tax rate.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxRateUpdate {
    /// Display name.
    pub name: String,
    /// Free text description.
    #[serde(default)]
    pub description: String,
    /// Rate as a fraction, 0.0 to 1.0 inclusive.
    pub rate: f64,
    /// Optional category.
    #[serde(default)]
    pub category: Option<String>,
    /// First day the rate is in force.
    pub effective_date: NaiveDate,
    /// Last day the rate is in force.
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
}

/// Input for registering a taxpayer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTaxpayer {
    /// Kind of taxpayer.
    pub taxpayer_type: TaxpayerType,
    /// Legal name.
    pub name: String,
    /// SSN, EIN or equivalent; unique.
    pub tax_identifier: String,
    /// Contact email.
    #[serde(default)]
    pub contact_email: String,
    /// Contact phone.
    #[serde(default)]
    pub contact_phone: String,
    /// Postal address.
    #[serde(default)]
    pub address: Address,
    /// Initial exemption codes.
    #[serde(default)]
    pub exemption_codes: Vec<String>,
    /// Annual revenue, for businesses.
    #[serde(default)]
    pub annual_revenue: MinorUnits,
    /// Business type, for businesses.
    #[serde(default)]
    pub business_type: String,
    /// Industry, for businesses.
    #[serde(default)]
    pub industry: String,
}

/// Input for opening a tax filing.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTaxFiling {
    /// Filing taxpayer.
    pub taxpayer_id: TaxpayerId,
    /// Tax year.
    pub tax_year: i32,
    /// Period kind.
    pub period: FilingPeriod,
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period; must be after `period_start`.
    pub period_end: NaiveDate,
    /// Kind of tax filed.
    pub filing_type: TaxType,
    /// Deadline.
    pub due_date: DateTime<Utc>,
}

/// Reported amounts of a draft filing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct FilingAmounts {
    /// Gross income (income tax).
    #[serde(default)]
    pub gross_income: MinorUnits,
    /// Taxable income (income tax).
    #[serde(default)]
    pub taxable_income: MinorUnits,
    /// Total sales (sales tax).
    #[serde(default)]
    pub total_sales: MinorUnits,
    /// Amount subject to tax.
    #[serde(default)]
    pub taxable_amount: MinorUnits,
}

/// Input for recording a tax payment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTaxPayment {
    /// Paying taxpayer.
    pub taxpayer_id: TaxpayerId,
    /// Filing the payment settles, if any.
    #[serde(default)]
    pub filing_id: Option<TaxFilingId>,
    /// Kind of tax paid.
    pub tax_type: TaxType,
    /// Amount in minor units; must be positive.
    pub amount: MinorUnits,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Value date.
    pub payment_date: NaiveDate,
    /// Free text notes.
    #[serde(default)]
    pub notes: String,
}

/// Business details of a taxpayer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BusinessInfo {
    /// Annual revenue in minor units.
    #[serde(default)]
    pub annual_revenue: MinorUnits,
    /// Legal form, e.g. "llc".
    #[serde(default)]
    pub business_type: String,
    /// Industry sector.
    #[serde(default)]
    pub industry: String,
}
