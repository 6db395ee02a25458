//! Tax rate service: rate maintenance and tax calculation.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tally_shared::types::{MinorUnits, TaxRateId};

use crate::treasury::error::TreasuryError;
use crate::treasury::repository::TaxRateRepository;
use crate::treasury::tax_rate::TaxRate;
use crate::treasury::types::{NewTaxRate, TaxRateUpdate, TaxType};

/// Maintains tax rates and applies them.
#[derive(Clone)]
pub struct TaxRateService {
    rates: Arc<dyn TaxRateRepository>,
}

impl TaxRateService {
    /// Creates a new tax rate service.
    pub fn new(rates: Arc<dyn TaxRateRepository>) -> Self {
        Self { rates }
    }

    /// Loads a tax rate.
    pub async fn get(&self, id: TaxRateId) -> Result<TaxRate, TreasuryError> {
        Ok(self.rates.get_by_id(id).await?)
    }

    /// Lists tax rates.
    pub async fn list(&self, limit: u64, offset: u64) -> Result<Vec<TaxRate>, TreasuryError> {
        Ok(self.rates.list(limit, offset).await?)
    }

    /// Lists rates of one kind of tax.
    pub async fn list_by_type(&self, tax_type: TaxType) -> Result<Vec<TaxRate>, TreasuryError> {
        Ok(self.rates.list_by_type(tax_type).await?)
    }

    /// Lists rates active and in effect today.
    pub async fn list_active(&self) -> Result<Vec<TaxRate>, TreasuryError> {
        Ok(self.rates.list_active(today()).await?)
    }

    /// Lists rates of a jurisdiction.
    pub async fn list_by_jurisdiction(
        &self,
        jurisdiction_code: &str,
    ) -> Result<Vec<TaxRate>, TreasuryError> {
        Ok(self.rates.list_by_jurisdiction(jurisdiction_code).await?)
    }

    /// Lists the income rates of a jurisdiction whose band contains `amount`.
    pub async fn rates_for_income(
        &self,
        jurisdiction_code: &str,
        amount: MinorUnits,
    ) -> Result<Vec<TaxRate>, TreasuryError> {
        Ok(self
            .rates
            .rates_for_income(jurisdiction_code, amount, today())
            .await?)
    }

    /// Income tax on `income`: the sum of every active income rate of the
    /// jurisdiction in effect today. Progressive bands each tax their own
    /// slice, so stacked bands add up to the marginal total.
    pub async fn calculate_income_tax(
        &self,
        jurisdiction_code: &str,
        income: MinorUnits,
    ) -> Result<MinorUnits, TreasuryError> {
        let total = self
            .active_in(jurisdiction_code, TaxType::Income)
            .await?
            .iter()
            .fold(0, |total: MinorUnits, rate| {
                total.saturating_add(rate.calculate_tax(income))
            });
        Ok(total)
    }

    /// Sales tax on `amount`. A rate matching `category` wins; otherwise the
    /// first uncategorised sales rate applies; otherwise no tax is due.
    pub async fn calculate_sales_tax(
        &self,
        jurisdiction_code: &str,
        amount: MinorUnits,
        category: Option<&str>,
    ) -> Result<MinorUnits, TreasuryError> {
        let rates = self.active_in(jurisdiction_code, TaxType::Sales).await?;
        let category = category.map(str::trim).filter(|c| !c.is_empty());

        let matched = category.and_then(|wanted| {
            rates
                .iter()
                .find(|rate| rate.category.as_deref() == Some(wanted))
        });
        let rate = matched.or_else(|| rates.iter().find(|rate| rate.category.is_none()));
        Ok(rate.map_or(0, |rate| rate.calculate_tax(amount)))
    }

    /// Creates a proposed rate.
    pub async fn create(&self, input: NewTaxRate) -> Result<TaxRate, TreasuryError> {
        let rate = TaxRate::new(input)?;
        self.rates.create(&rate).await?;
        tracing::info!(
            tax_rate_id = %rate.id,
            tax_type = %rate.tax_type,
            jurisdiction = %rate.jurisdiction_code,
            "tax rate created"
        );
        Ok(rate)
    }

    /// Replaces the editable fields of a rate.
    pub async fn update(
        &self,
        id: TaxRateId,
        update: TaxRateUpdate,
    ) -> Result<TaxRate, TreasuryError> {
        let mut rate = self.rates.get_by_id(id).await?;
        rate.update(update)?;
        Ok(self.rates.update(&rate).await?)
    }

    /// Puts a proposed or inactive rate in force.
    pub async fn activate(&self, id: TaxRateId) -> Result<TaxRate, TreasuryError> {
        self.transition(id, TaxRate::activate).await
    }

    /// Suspends an active rate.
    pub async fn deactivate(&self, id: TaxRateId) -> Result<TaxRate, TreasuryError> {
        self.transition(id, TaxRate::deactivate).await
    }

    /// Retires a rate permanently.
    pub async fn archive(&self, id: TaxRateId) -> Result<TaxRate, TreasuryError> {
        self.transition(id, TaxRate::archive).await
    }

    async fn transition(
        &self,
        id: TaxRateId,
        apply: fn(&mut TaxRate) -> Result<(), TreasuryError>,
    ) -> Result<TaxRate, TreasuryError> {
        let mut rate = self.rates.get_by_id(id).await?;
        apply(&mut rate)?;
        let rate = self.rates.update(&rate).await?;
        tracing::info!(tax_rate_id = %rate.id, status = %rate.status, "tax rate status changed");
        Ok(rate)
    }

    async fn active_in(
        &self,
        jurisdiction_code: &str,
        tax_type: TaxType,
    ) -> Result<Vec<TaxRate>, TreasuryError> {
        let mut rates = self.rates.list_active(today()).await?;
        rates.retain(|rate| rate.tax_type == tax_type && rate.jurisdiction_code == jurisdiction_code);
        Ok(rates)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;
    use crate::treasury::types::{BracketType, TaxRateStatus};
    use chrono::Duration;
    use rstest::rstest;

    fn service() -> TaxRateService {
        TaxRateService::new(Arc::new(MemoryStore::new()))
    }

    fn input(
        tax_type: TaxType,
        bracket_type: BracketType,
        rate: f64,
        bounds: (Option<MinorUnits>, Option<MinorUnits>),
        category: Option<&str>,
    ) -> NewTaxRate {
        NewTaxRate {
            tax_type,
            name: format!("{tax_type} {bracket_type}"),
            description: String::new(),
            rate,
            bracket_type,
            min_amount: bounds.0,
            max_amount: bounds.1,
            category: category.map(str::to_string),
            jurisdiction_code: "US-NY".into(),
            effective_date: today() - Duration::days(30),
            expiration_date: None,
        }
    }

    async fn active(service: &TaxRateService, input: NewTaxRate) -> TaxRate {
        let rate = service.create(input).await.unwrap();
        service.activate(rate.id).await.unwrap()
    }

    #[tokio::test]
    async fn test_income_tax_sums_progressive_bands() {
        let service = service();
        let bands = [
            (0.10, None, Some(1000)),
            (0.20, Some(1000), Some(5000)),
            (0.30, Some(5000), None),
        ];
        for (rate, min, max) in bands {
            active(
                &service,
                input(TaxType::Income, BracketType::Progressive, rate, (min, max), None),
            )
            .await;
        }

        // 1000 * 0.10 + 4000 * 0.20 + 1000 * 0.30
        let tax = service.calculate_income_tax("US-NY", 6000).await.unwrap();
        assert_eq!(tax, 1200);
        assert_eq!(service.calculate_income_tax("US-TX", 6000).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_income_tax_ignores_inactive_and_future_rates() {
        let service = service();
        service
            .create(input(TaxType::Income, BracketType::Flat, 0.5, (None, None), None))
            .await
            .unwrap();
        let mut future = input(TaxType::Income, BracketType::Flat, 0.5, (None, None), None);
        future.effective_date = today() + Duration::days(10);
        active(&service, future).await;
        active(
            &service,
            input(TaxType::Income, BracketType::Flat, 0.1, (None, None), None),
        )
        .await;

        assert_eq!(service.calculate_income_tax("US-NY", 1000).await.unwrap(), 100);
    }

    #[rstest]
    #[case(Some("luxury"), 200)]
    #[case(Some("food"), 80)]
    #[case(None, 80)]
    #[tokio::test]
    async fn test_sales_tax_prefers_category(
        #[case] category: Option<&'static str>,
        #[case] expected: MinorUnits,
    ) {
        let service = service();
        active(
            &service,
            input(TaxType::Sales, BracketType::Flat, 0.08, (None, None), None),
        )
        .await;
        active(
            &service,
            input(TaxType::Sales, BracketType::Flat, 0.20, (None, None), Some("luxury")),
        )
        .await;

        let tax = service
            .calculate_sales_tax("US-NY", 1000, category)
            .await
            .unwrap();
        assert_eq!(tax, expected);
    }

    #[tokio::test]
    async fn test_sales_tax_without_rate_is_zero() {
        let service = service();
        active(
            &service,
            input(TaxType::Sales, BracketType::Flat, 0.20, (None, None), Some("luxury")),
        )
        .await;
        let tax = service
            .calculate_sales_tax("US-NY", 1000, Some("food"))
            .await
            .unwrap();
        assert_eq!(tax, 0);
    }

    #[tokio::test]
    async fn test_lifecycle_is_persisted() {
        let service = service();
        let rate = service
            .create(input(TaxType::Excise, BracketType::Flat, 0.05, (None, None), None))
            .await
            .unwrap();
        assert_eq!(rate.status, TaxRateStatus::Proposed);
        assert!(service.list_active().await.unwrap().is_empty());

        service.activate(rate.id).await.unwrap();
        assert_eq!(service.list_active().await.unwrap().len(), 1);

        service.archive(rate.id).await.unwrap();
        let err = service.activate(rate.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(
            service.get(rate.id).await.unwrap().status,
            TaxRateStatus::Archived
        );
    }

    #[tokio::test]
    async fn test_update_and_queries() {
        let service = service();
        let rate = service
            .create(input(TaxType::Property, BracketType::Flat, 0.01, (None, None), None))
            .await
            .unwrap();

        let updated = service
            .update(
                rate.id,
                TaxRateUpdate {
                    name: "Property levy".into(),
                    description: String::new(),
                    rate: 0.015,
                    category: None,
                    effective_date: rate.effective_date,
                    expiration_date: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Property levy");

        assert_eq!(service.list_by_type(TaxType::Property).await.unwrap().len(), 1);
        assert!(service.list_by_type(TaxType::Sales).await.unwrap().is_empty());
        assert_eq!(service.list_by_jurisdiction("US-NY").await.unwrap().len(), 1);
        assert_eq!(service.list(10, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rates_for_income_filters_by_band() {
        let service = service();
        active(
            &service,
            input(TaxType::Income, BracketType::Tiered, 0.1, (Some(0), Some(1000)), None),
        )
        .await;
        active(
            &service,
            input(TaxType::Income, BracketType::Tiered, 0.2, (Some(1001), None), None),
        )
        .await;

        let rates = service.rates_for_income("US-NY", 500).await.unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].max_amount, Some(1000));
    }

    #[tokio::test]
    async fn test_get_missing_rate() {
        let err = service().get(TaxRateId::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
