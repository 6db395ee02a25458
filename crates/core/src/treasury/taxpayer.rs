//! Taxpayer entity.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{Address, MinorUnits, TaxpayerId};

use crate::treasury::types::{BusinessInfo, NewTaxpayer, TaxpayerStatus, TaxpayerType};

/// A person or organisation liable for tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxpayer {
    /// Identifier.
    pub id: TaxpayerId,
    /// Kind of taxpayer.
    pub taxpayer_type: TaxpayerType,
    /// Standing.
    pub status: TaxpayerStatus,
    /// Legal name.
    pub name: String,
    /// SSN, EIN or equivalent (unique).
    pub tax_identifier: String,
    /// Contact email.
    pub contact_email: String,
    /// Contact phone.
    pub contact_phone: String,
    /// Postal address.
    pub address: Address,
    /// Exemption codes held.
    pub exemption_codes: BTreeSet<String>,
    /// Annual revenue, for businesses.
    pub annual_revenue: MinorUnits,
    /// Legal form, for businesses.
    pub business_type: String,
    /// Industry, for businesses.
    pub industry: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Taxpayer {
    /// Registers an active taxpayer.
    #[must_use]
    pub fn new(input: NewTaxpayer) -> Self {
        let now = Utc::now();
        Self {
            id: TaxpayerId::new(),
            taxpayer_type: input.taxpayer_type,
            status: TaxpayerStatus::Active,
            name: input.name,
            tax_identifier: input.tax_identifier,
            contact_email: input.contact_email,
            contact_phone: input.contact_phone,
            address: input.address,
            exemption_codes: input
                .exemption_codes
                .into_iter()
                .filter(|code| !code.trim().is_empty())
                .collect(),
            annual_revenue: input.annual_revenue,
            business_type: input.business_type,
            industry: input.industry,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the taxpayer is in good standing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TaxpayerStatus::Active
    }

    /// Returns true if the taxpayer is exempt from taxation.
    #[must_use]
    pub fn is_exempt(&self) -> bool {
        self.status == TaxpayerStatus::Exempt
    }

    /// Returns true if the taxpayer holds `code`.
    #[must_use]
    pub fn has_exemption(&self, code: &str) -> bool {
        self.exemption_codes.contains(code)
    }

    /// Sets the standing.
    pub fn update_status(&mut self, status: TaxpayerStatus) {
        self.status = status;
        self.touch();
    }

    /// Replaces email and phone.
    pub fn update_contact(&mut self, email: String, phone: String) {
        self.contact_email = email;
        self.contact_phone = phone;
        self.touch();
    }

    /// Replaces the postal address.
    pub fn update_address(&mut self, address: Address) {
        self.address = address;
        self.touch();
    }

    /// Replaces revenue, legal form and industry.
    pub fn update_business_info(&mut self, info: BusinessInfo) {
        self.annual_revenue = info.annual_revenue;
        self.business_type = info.business_type;
        self.industry = info.industry;
        self.touch();
    }

    /// Adds an exemption code. Adding a held code changes nothing.
    pub fn add_exemption(&mut self, code: &str) {
        if self.exemption_codes.insert(code.to_string()) {
            self.touch();
        }
    }

    /// Removes an exemption code, if held.
    pub fn remove_exemption(&mut self, code: &str) {
        if self.exemption_codes.remove(code) {
            self.touch();
        }
    }

    /// Case-insensitive substring match on name, identifier or email.
    /// `needle` must already be lower case.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.tax_identifier, &self.contact_email]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn business() -> Taxpayer {
        Taxpayer::new(NewTaxpayer {
            taxpayer_type: TaxpayerType::Business,
            name: "Acme Widgets".into(),
            tax_identifier: "12-3456789".into(),
            contact_email: "tax@acme.test".into(),
            contact_phone: String::new(),
            address: Address::default(),
            exemption_codes: vec!["EX1".into(), "EX1".into(), " ".into()],
            annual_revenue: 1_000_000,
            business_type: "llc".into(),
            industry: "manufacturing".into(),
        })
    }

    #[test]
    fn test_new_taxpayer_is_active_with_unique_codes() {
        let taxpayer = business();
        assert!(taxpayer.is_active());
        assert!(!taxpayer.is_exempt());
        assert_eq!(taxpayer.exemption_codes.len(), 1);
        assert!(taxpayer.has_exemption("EX1"));
    }

    #[test]
    fn test_exemptions_add_idempotent_and_remove() {
        let mut taxpayer = business();
        taxpayer.add_exemption("EX2");
        taxpayer.add_exemption("EX2");
        assert_eq!(taxpayer.exemption_codes.len(), 2);

        taxpayer.remove_exemption("EX1");
        taxpayer.remove_exemption("missing");
        assert!(!taxpayer.has_exemption("EX1"));
        assert!(taxpayer.has_exemption("EX2"));
    }

    #[test]
    fn test_updates() {
        let mut taxpayer = business();
        taxpayer.update_status(TaxpayerStatus::Exempt);
        assert!(taxpayer.is_exempt());

        taxpayer.update_contact("new@acme.test".into(), "555-0199".into());
        assert_eq!(taxpayer.contact_email, "new@acme.test");

        taxpayer.update_business_info(BusinessInfo {
            annual_revenue: 5,
            business_type: "corp".into(),
            industry: "retail".into(),
        });
        assert_eq!(taxpayer.industry, "retail");
        assert_eq!(taxpayer.annual_revenue, 5);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let taxpayer = business();
        assert!(taxpayer.matches("acme"));
        assert!(taxpayer.matches("3456"));
        assert!(taxpayer.matches("tax@"));
        assert!(!taxpayer.matches("globex"));
    }
}
