//! Taxpayer service.

use std::sync::Arc;

use tally_shared::types::{Address, TaxpayerId};

use crate::error::RepositoryError;
use crate::treasury::error::TreasuryError;
use crate::treasury::repository::TaxpayerRepository;
use crate::treasury::taxpayer::Taxpayer;
use crate::treasury::types::{BusinessInfo, NewTaxpayer, TaxpayerStatus, TaxpayerType};

/// Registers taxpayers and keeps their records current.
#[derive(Clone)]
pub struct TaxpayerService {
    taxpayers: Arc<dyn TaxpayerRepository>,
}

impl TaxpayerService {
    /// Creates a new taxpayer service.
    pub fn new(taxpayers: Arc<dyn TaxpayerRepository>) -> Self {
        Self { taxpayers }
    }

    /// Loads a taxpayer.
    pub async fn get(&self, id: TaxpayerId) -> Result<Taxpayer, TreasuryError> {
        Ok(self.taxpayers.get_by_id(id).await?)
    }

    /// Finds a taxpayer by SSN, EIN or equivalent.
    pub async fn get_by_tax_identifier(
        &self,
        tax_identifier: &str,
    ) -> Result<Taxpayer, TreasuryError> {
        self.taxpayers
            .get_by_tax_identifier(tax_identifier)
            .await?
            .ok_or_else(|| RepositoryError::not_found("taxpayer", tax_identifier).into())
    }

    /// Lists taxpayers.
    pub async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Taxpayer>, TreasuryError> {
        Ok(self.taxpayers.list(limit, offset).await?)
    }

    /// Lists taxpayers of one kind.
    pub async fn list_by_type(
        &self,
        taxpayer_type: TaxpayerType,
    ) -> Result<Vec<Taxpayer>, TreasuryError> {
        Ok(self.taxpayers.list_by_type(taxpayer_type).await?)
    }

    /// Lists taxpayers in one standing.
    pub async fn list_by_status(
        &self,
        status: TaxpayerStatus,
    ) -> Result<Vec<Taxpayer>, TreasuryError> {
        Ok(self.taxpayers.list_by_status(status).await?)
    }

    /// Lists business taxpayers of an industry.
    pub async fn list_businesses_by_industry(
        &self,
        industry: &str,
    ) -> Result<Vec<Taxpayer>, TreasuryError> {
        Ok(self.taxpayers.list_businesses_by_industry(industry).await?)
    }

    /// Searches name, tax identifier and contact email. A blank query
    /// matches nothing.
    pub async fn search(&self, query: &str, limit: u64) -> Result<Vec<Taxpayer>, TreasuryError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.taxpayers.search(query, limit).await?)
    }

    /// Registers a taxpayer. Fails if the tax identifier is taken.
    pub async fn create(&self, input: NewTaxpayer) -> Result<Taxpayer, TreasuryError> {
        if input.name.trim().is_empty() || input.tax_identifier.trim().is_empty() {
            return Err(TreasuryError::InvalidInput(
                "name and tax identifier are required".into(),
            ));
        }
        if self
            .taxpayers
            .get_by_tax_identifier(&input.tax_identifier)
            .await?
            .is_some()
        {
            return Err(TreasuryError::TaxpayerExists(input.tax_identifier));
        }

        let taxpayer = Taxpayer::new(input);
        self.taxpayers.create(&taxpayer).await?;
        tracing::info!(
            taxpayer_id = %taxpayer.id,
            taxpayer_type = %taxpayer.taxpayer_type,
            "taxpayer registered"
        );
        Ok(taxpayer)
    }

    /// Sets the standing.
    pub async fn update_status(
        &self,
        id: TaxpayerId,
        status: TaxpayerStatus,
    ) -> Result<Taxpayer, TreasuryError> {
        self.modify(id, |t| t.update_status(status)).await
    }

    /// Replaces email and phone.
    pub async fn update_contact(
        &self,
        id: TaxpayerId,
        email: String,
        phone: String,
    ) -> Result<Taxpayer, TreasuryError> {
        self.modify(id, |t| t.update_contact(email, phone)).await
    }

    /// Replaces the postal address.
    pub async fn update_address(
        &self,
        id: TaxpayerId,
        address: Address,
    ) -> Result<Taxpayer, TreasuryError> {
        self.modify(id, |t| t.update_address(address)).await
    }

    /// Replaces revenue, legal form and industry.
    pub async fn update_business_info(
        &self,
        id: TaxpayerId,
        info: BusinessInfo,
    ) -> Result<Taxpayer, TreasuryError> {
        self.modify(id, |t| t.update_business_info(info)).await
    }

    /// Grants an exemption code. Granting a held code is a no-op.
    pub async fn add_exemption(&self, id: TaxpayerId, code: &str) -> Result<Taxpayer, TreasuryError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(TreasuryError::InvalidInput(
                "exemption code must not be empty".into(),
            ));
        }
        self.modify(id, |t| t.add_exemption(code)).await
    }

    /// Revokes an exemption code.
    pub async fn remove_exemption(
        &self,
        id: TaxpayerId,
        code: &str,
    ) -> Result<Taxpayer, TreasuryError> {
        self.modify(id, |t| t.remove_exemption(code.trim())).await
    }

    async fn modify(
        &self,
        id: TaxpayerId,
        change: impl FnOnce(&mut Taxpayer) + Send,
    ) -> Result<Taxpayer, TreasuryError> {
        let mut taxpayer = self.taxpayers.get_by_id(id).await?;
        change(&mut taxpayer);
        Ok(self.taxpayers.update(&taxpayer).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;

    fn service() -> TaxpayerService {
        TaxpayerService::new(Arc::new(MemoryStore::new()))
    }

    fn input(taxpayer_type: TaxpayerType, name: &str, tax_identifier: &str) -> NewTaxpayer {
        NewTaxpayer {
            taxpayer_type,
            name: name.into(),
            tax_identifier: tax_identifier.into(),
            contact_email: format!("{}@example.test", name.to_lowercase().replace(' ', ".")),
            contact_phone: String::new(),
            address: Address::default(),
            exemption_codes: Vec::new(),
            annual_revenue: 0,
            business_type: String::new(),
            industry: "retail".into(),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let service = service();
        let created = service
            .create(input(TaxpayerType::Individual, "Ada Lovelace", "111-22-3333"))
            .await
            .unwrap();

        assert_eq!(service.get(created.id).await.unwrap(), created);
        assert_eq!(
            service.get_by_tax_identifier("111-22-3333").await.unwrap().id,
            created.id
        );
        assert_eq!(
            service
                .get_by_tax_identifier("999")
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_duplicate_identifier_rejected() {
        let service = service();
        service
            .create(input(TaxpayerType::Individual, "Ada Lovelace", "111-22-3333"))
            .await
            .unwrap();
        let err = service
            .create(input(TaxpayerType::Business, "Other", "111-22-3333"))
            .await
            .unwrap_err();
        assert!(matches!(err, TreasuryError::TaxpayerExists(_)));
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_search_and_filters() {
        let service = service();
        service
            .create(input(TaxpayerType::Individual, "Ada Lovelace", "111-22-3333"))
            .await
            .unwrap();
        let acme = service
            .create(input(TaxpayerType::Business, "Acme Retail", "12-3456789"))
            .await
            .unwrap();
        service
            .create(input(TaxpayerType::NonProfit, "Retail Relief", "98-7654321"))
            .await
            .unwrap();

        assert_eq!(service.search("RETAIL", 10).await.unwrap().len(), 2);
        assert_eq!(service.search("retail", 1).await.unwrap().len(), 1);
        assert_eq!(service.search("3456", 10).await.unwrap()[0].id, acme.id);
        assert!(service.search("  ", 10).await.unwrap().is_empty());

        let businesses = service.list_businesses_by_industry("retail").await.unwrap();
        assert_eq!(businesses.len(), 1);
        assert_eq!(businesses[0].id, acme.id);

        assert_eq!(
            service
                .list_by_type(TaxpayerType::Individual)
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(service.list(2, 1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_updates_are_persisted() {
        let service = service();
        let taxpayer = service
            .create(input(TaxpayerType::Business, "Acme Retail", "12-3456789"))
            .await
            .unwrap();

        service
            .update_status(taxpayer.id, TaxpayerStatus::Delinquent)
            .await
            .unwrap();
        service.add_exemption(taxpayer.id, "NP-501").await.unwrap();
        service.add_exemption(taxpayer.id, "NP-501").await.unwrap();
        service
            .update_business_info(
                taxpayer.id,
                BusinessInfo {
                    annual_revenue: 250_000,
                    business_type: "llc".into(),
                    industry: "wholesale".into(),
                },
            )
            .await
            .unwrap();

        let stored = service.get(taxpayer.id).await.unwrap();
        assert_eq!(stored.status, TaxpayerStatus::Delinquent);
        assert_eq!(stored.exemption_codes.len(), 1);
        assert_eq!(stored.industry, "wholesale");
        assert_eq!(
            service
                .list_by_status(TaxpayerStatus::Delinquent)
                .await
                .unwrap()
                .len(),
            1
        );

        let stored = service.remove_exemption(taxpayer.id, "NP-501").await.unwrap();
        assert!(stored.exemption_codes.is_empty());

        let err = service.add_exemption(taxpayer.id, " ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_update_contact_and_address() {
        let service = service();
        let taxpayer = service
            .create(input(TaxpayerType::Individual, "Ada Lovelace", "111-22-3333"))
            .await
            .unwrap();

        service
            .update_contact(taxpayer.id, "ada@new.test".into(), "555-0100".into())
            .await
            .unwrap();
        let stored = service
            .update_address(
                taxpayer.id,
                Address {
                    city: "London".into(),
                    ..Address::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(stored.contact_email, "ada@new.test");
        assert_eq!(stored.address.city, "London");
    }
}
