//! Tax rate entity and bracket arithmetic.
//!
//! Rates are stored as `f64` fractions. Every product of an amount and a
//! rate is truncated toward zero before it becomes minor units again.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{MinorUnits, TaxRateId};

use crate::treasury::error::TreasuryError;
use crate::treasury::types::{BracketType, NewTaxRate, TaxRateStatus, TaxRateUpdate, TaxType};

/// A tax rate for one kind of tax in one jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRate {
    /// Identifier.
    pub id: TaxRateId,
    /// Kind of tax.
    pub tax_type: TaxType,
    /// Display name.
    pub name: String,
    /// Free text description.
    pub description: String,
    /// Rate as a fraction (0.07 for 7%).
    pub rate: f64,
    /// How the rate is applied.
    pub bracket_type: BracketType,
    /// Lower bound of the band; `None` or zero means unbounded.
    pub min_amount: Option<MinorUnits>,
    /// Upper bound of the band; `None` or zero means unbounded.
    pub max_amount: Option<MinorUnits>,
    /// Lifecycle status.
    pub status: TaxRateStatus,
    /// Optional category, e.g. "luxury" for sales tax.
    pub category: Option<String>,
    /// Geographic jurisdiction code.
    pub jurisdiction_code: String,
    /// First day the rate is in force.
    pub effective_date: NaiveDate,
    /// Last day the rate is in force.
    pub expiration_date: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaxRate {
    /// Creates a proposed tax rate.
    pub fn new(input: NewTaxRate) -> Result<Self, TreasuryError> {
        validate_rate(input.rate)?;
        validate_bracket(input.bracket_type, input.min_amount, input.max_amount)?;
        if input.jurisdiction_code.trim().is_empty() {
            return Err(TreasuryError::InvalidInput(
                "jurisdiction code is required".into(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: TaxRateId::new(),
            tax_type: input.tax_type,
            name: input.name,
            description: input.description,
            rate: input.rate,
            bracket_type: input.bracket_type,
            min_amount: input.min_amount,
            max_amount: input.max_amount,
            status: TaxRateStatus::Proposed,
            category: normalize_category(input.category),
            jurisdiction_code: input.jurisdiction_code,
            effective_date: input.effective_date,
            expiration_date: input.expiration_date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns true if the rate is in force.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TaxRateStatus::Active
    }

    /// Returns true if `date` falls between the effective and expiration
    /// dates, both inclusive.
    #[must_use]
    pub fn is_in_effect(&self, date: NaiveDate) -> bool {
        self.effective_date <= date && self.expiration_date.is_none_or(|end| date <= end)
    }

    /// Activates a proposed or inactive rate.
    pub fn activate(&mut self) -> Result<(), TreasuryError> {
        match self.status {
            TaxRateStatus::Proposed | TaxRateStatus::Inactive => {
                self.status = TaxRateStatus::Active;
                self.touch();
                Ok(())
            }
            TaxRateStatus::Active | TaxRateStatus::Archived => {
                Err(self.invalid_status("activate"))
            }
        }
    }

    /// Suspends an active rate.
    pub fn deactivate(&mut self) -> Result<(), TreasuryError> {
        if self.status != TaxRateStatus::Active {
            return Err(self.invalid_status("deactivate"));
        }
        self.status = TaxRateStatus::Inactive;
        self.touch();
        Ok(())
    }

    /// Retires the rate permanently.
    pub fn archive(&mut self) -> Result<(), TreasuryError> {
        if self.status == TaxRateStatus::Archived {
            return Err(self.invalid_status("archive"));
        }
        self.status = TaxRateStatus::Archived;
        self.touch();
        Ok(())
    }

    /// Replaces the editable fields.
    pub fn update(&mut self, update: TaxRateUpdate) -> Result<(), TreasuryError> {
        if self.status == TaxRateStatus::Archived {
            return Err(self.invalid_status("update"));
        }
        validate_rate(update.rate)?;

        self.name = update.name;
        self.description = update.description;
        self.rate = update.rate;
        self.category = normalize_category(update.category);
        self.effective_date = update.effective_date;
        self.expiration_date = update.expiration_date;
        self.touch();
        Ok(())
    }

    /// Returns true if the rate applies to `amount`. Flat rates always apply;
    /// other brackets require the amount to lie within the set bounds.
    #[must_use]
    pub fn is_applicable(&self, amount: MinorUnits) -> bool {
        if self.bracket_type == BracketType::Flat {
            return true;
        }
        if let Some(min) = self.min_bound()
            && amount < min
        {
            return false;
        }
        if let Some(max) = self.max_bound()
            && amount > max
        {
            return false;
        }
        true
    }

    /// Tax due on `amount` under this rate.
    ///
    /// Progressive rates tax only the slice of the amount above the minimum,
    /// capped at `max - min`. Tiered rates tax the whole amount when it falls
    /// inside the tier and nothing otherwise. Flat rates tax the whole amount.
    #[must_use]
    pub fn calculate_tax(&self, amount: MinorUnits) -> MinorUnits {
        match self.bracket_type {
            BracketType::Flat => apply_rate(amount, self.rate),
            BracketType::Tiered => {
                if self.is_applicable(amount) {
                    apply_rate(amount, self.rate)
                } else {
                    0
                }
            }
            BracketType::Progressive => {
                let min = self.min_bound().unwrap_or(0);
                if amount < min {
                    return 0;
                }
                let mut taxable = amount - min;
                if let Some(max) = self.max_bound()
                    && amount > max
                {
                    taxable = max - min;
                }
                apply_rate(taxable, self.rate)
            }
        }
    }

    fn min_bound(&self) -> Option<MinorUnits> {
        self.min_amount.filter(|min| *min > 0)
    }

    fn max_bound(&self) -> Option<MinorUnits> {
        self.max_amount.filter(|max| *max > 0)
    }

    fn invalid_status(&self, action: &'static str) -> TreasuryError {
        TreasuryError::InvalidTaxRateStatus {
            id: self.id,
            status: self.status,
            action,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[allow(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]
fn apply_rate(amount: MinorUnits, rate: f64) -> MinorUnits {
    (amount as f64 * rate) as MinorUnits
}

fn validate_rate(rate: f64) -> Result<(), TreasuryError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(TreasuryError::InvalidTaxRate(rate))
    }
}

fn validate_bracket(
    bracket_type: BracketType,
    min: Option<MinorUnits>,
    max: Option<MinorUnits>,
) -> Result<(), TreasuryError> {
    if let Some(amount) = [min, max].into_iter().flatten().find(|a| *a < 0) {
        return Err(TreasuryError::InvalidAmount(amount));
    }
    if bracket_type == BracketType::Progressive
        && let (Some(min), Some(max)) = (min, max)
        && max > 0
        && max <= min
    {
        return Err(TreasuryError::InvalidBracket { min, max });
    }
    Ok(())
}

fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;

    fn rate(
        bracket_type: BracketType,
        rate: f64,
        min_amount: Option<MinorUnits>,
        max_amount: Option<MinorUnits>,
    ) -> TaxRate {
        TaxRate::new(NewTaxRate {
            tax_type: TaxType::Income,
            name: "Bracket".into(),
            description: String::new(),
            rate,
            bracket_type,
            min_amount,
            max_amount,
            category: None,
            jurisdiction_code: "US-CA".into(),
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expiration_date: NaiveDate::from_ymd_opt(2024, 12, 31),
        })
        .unwrap()
    }

    #[rstest]
    #[case(3000, 200)]
    #[case(500, 0)]
    #[case(1000, 0)]
    #[case(10_000, 400)]
    #[case(5000, 400)]
    fn test_progressive_taxes_slice_above_min(
        #[case] amount: MinorUnits,
        #[case] expected: MinorUnits,
    ) {
        let bracket = rate(BracketType::Progressive, 0.10, Some(1000), Some(5000));
        assert_eq!(bracket.calculate_tax(amount), expected);
    }

    #[test]
    fn test_progressive_without_bounds_taxes_everything() {
        let bracket = rate(BracketType::Progressive, 0.25, None, None);
        assert_eq!(bracket.calculate_tax(1000), 250);
    }

    #[rstest]
    #[case(999, 0)]
    #[case(1000, 50)]
    #[case(5000, 250)]
    #[case(5001, 0)]
    fn test_tiered_taxes_whole_amount_inside_tier(
        #[case] amount: MinorUnits,
        #[case] expected: MinorUnits,
    ) {
        let tier = rate(BracketType::Tiered, 0.05, Some(1000), Some(5000));
        assert_eq!(tier.calculate_tax(amount), expected);
    }

    #[rstest]
    #[case(999, 69)]
    #[case(-999, -69)]
    #[case(0, 0)]
    fn test_flat_truncates_toward_zero(#[case] amount: MinorUnits, #[case] expected: MinorUnits) {
        let flat = rate(BracketType::Flat, 0.07, Some(5000), Some(6000));
        assert!(flat.is_applicable(amount));
        assert_eq!(flat.calculate_tax(amount), expected);
    }

    #[rstest]
    #[case(-0.01)]
    #[case(1.01)]
    #[case(f64::NAN)]
    fn test_rejects_out_of_range_rate(#[case] value: f64) {
        let err = TaxRate::new(NewTaxRate {
            tax_type: TaxType::Sales,
            name: "Bad".into(),
            description: String::new(),
            rate: value,
            bracket_type: BracketType::Flat,
            min_amount: None,
            max_amount: None,
            category: None,
            jurisdiction_code: "US".into(),
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expiration_date: None,
        })
        .unwrap_err();
        assert!(matches!(err, TreasuryError::InvalidTaxRate(_)));
    }

    #[test]
    fn test_rate_bounds_are_inclusive() {
        assert_eq!(rate(BracketType::Flat, 0.0, None, None).calculate_tax(100), 0);
        assert_eq!(rate(BracketType::Flat, 1.0, None, None).calculate_tax(100), 100);
    }

    #[test]
    fn test_progressive_requires_max_above_min() {
        let err = TaxRate::new(NewTaxRate {
            tax_type: TaxType::Income,
            name: "Inverted".into(),
            description: String::new(),
            rate: 0.1,
            bracket_type: BracketType::Progressive,
            min_amount: Some(5000),
            max_amount: Some(5000),
            category: None,
            jurisdiction_code: "US".into(),
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expiration_date: None,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            TreasuryError::InvalidBracket {
                min: 5000,
                max: 5000
            }
        ));
    }

    #[test]
    fn test_status_transitions() {
        let mut tax = rate(BracketType::Flat, 0.1, None, None);
        assert_eq!(tax.status, TaxRateStatus::Proposed);

        tax.activate().unwrap();
        assert!(tax.is_active());
        assert!(tax.activate().is_err());

        tax.deactivate().unwrap();
        assert_eq!(tax.status, TaxRateStatus::Inactive);
        assert!(tax.deactivate().is_err());

        tax.activate().unwrap();
        tax.archive().unwrap();
        assert_eq!(tax.status, TaxRateStatus::Archived);

        for err in [tax.activate(), tax.deactivate(), tax.archive()] {
            assert_eq!(err.unwrap_err().kind(), ErrorKind::InvalidState);
        }
    }

    #[test]
    fn test_update_revalidates_and_refuses_archived() {
        let mut tax = rate(BracketType::Flat, 0.1, None, None);
        let update = TaxRateUpdate {
            name: "Renamed".into(),
            description: "new".into(),
            rate: 0.2,
            category: Some("  luxury ".into()),
            effective_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            expiration_date: None,
        };

        let err = tax
            .update(TaxRateUpdate {
                rate: 2.0,
                ..update.clone()
            })
            .unwrap_err();
        assert!(matches!(err, TreasuryError::InvalidTaxRate(_)));
        assert_eq!(tax.name, "Bracket");

        tax.update(update.clone()).unwrap();
        assert_eq!(tax.name, "Renamed");
        assert_eq!(tax.category.as_deref(), Some("luxury"));
        assert_eq!(tax.calculate_tax(100), 20);

        tax.archive().unwrap();
        assert_eq!(tax.update(update).unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[rstest]
    #[case(2023, 12, 31, false)]
    #[case(2024, 1, 1, true)]
    #[case(2024, 12, 31, true)]
    #[case(2025, 1, 1, false)]
    fn test_is_in_effect(#[case] y: i32, #[case] m: u32, #[case] d: u32, #[case] expected: bool) {
        let tax = rate(BracketType::Flat, 0.1, None, None);
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(tax.is_in_effect(date), expected);
    }
}
