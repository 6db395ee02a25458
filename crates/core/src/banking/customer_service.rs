//! Customer service.

use std::sync::Arc;

use tally_shared::types::{Address, CustomerId};

use crate::banking::customer::Customer;
use crate::banking::error::BankingError;
use crate::banking::repository::CustomerRepository;
use crate::banking::types::{CustomerStatus, NewCustomer};
use crate::error::RepositoryError;

/// Replacement details for an existing customer.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CustomerUpdate {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email, unique across customers.
    pub email: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone_number: String,
    /// Postal address.
    #[serde(default)]
    pub address: Address,
}

/// Registers and maintains customers.
#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerRepository>,
}

impl CustomerService {
    /// Creates a new customer service.
    pub fn new(customers: Arc<dyn CustomerRepository>) -> Self {
        Self { customers }
    }

    /// Loads a customer.
    pub async fn get(&self, id: CustomerId) -> Result<Customer, BankingError> {
        Ok(self.customers.get_by_id(id).await?)
    }

    /// Finds a customer by email.
    pub async fn get_by_email(&self, email: &str) -> Result<Customer, BankingError> {
        self.customers
            .get_by_email(email)
            .await?
            .ok_or_else(|| RepositoryError::not_found("customer", email).into())
    }

    /// Lists customers.
    pub async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Customer>, BankingError> {
        Ok(self.customers.list(limit, offset).await?)
    }

    /// Registers a customer. Fails if the email is taken.
    pub async fn create(&self, input: NewCustomer) -> Result<Customer, BankingError> {
        validate_names(&input.first_name, &input.last_name, &input.email)?;
        if self.customers.get_by_email(&input.email).await?.is_some() {
            return Err(BankingError::CustomerExists(input.email));
        }

        let customer = Customer::new(input);
        self.customers.create(&customer).await?;
        tracing::info!(customer_id = %customer.id, "customer registered");
        Ok(customer)
    }

    /// Replaces names, contact details and address.
    pub async fn update(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Customer, BankingError> {
        validate_names(&update.first_name, &update.last_name, &update.email)?;
        let mut customer = self.customers.get_by_id(id).await?;

        if update.email != customer.email
            && let Some(existing) = self.customers.get_by_email(&update.email).await?
            && existing.id != id
        {
            return Err(BankingError::CustomerExists(update.email));
        }

        customer.first_name = update.first_name;
        customer.last_name = update.last_name;
        customer.update_contact(update.email, update.phone_number);
        customer.update_address(update.address);
        Ok(self.customers.update(&customer).await?)
    }

    /// Sets the customer status.
    pub async fn update_status(
        &self,
        id: CustomerId,
        status: CustomerStatus,
    ) -> Result<Customer, BankingError> {
        let mut customer = self.customers.get_by_id(id).await?;
        customer.update_status(status);
        Ok(self.customers.update(&customer).await?)
    }
}

fn validate_names(first_name: &str, last_name: &str, email: &str) -> Result<(), BankingError> {
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(BankingError::InvalidInput(
            "first and last name are required".into(),
        ));
    }
    if !email.contains('@') {
        return Err(BankingError::InvalidInput(format!(
            "'{email}' is not an email address"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;

    fn service() -> CustomerService {
        CustomerService::new(Arc::new(MemoryStore::new()))
    }

    fn input(email: &str) -> NewCustomer {
        NewCustomer {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: email.into(),
            phone_number: "555-0101".into(),
            address: Address {
                city: "Arlington".into(),
                ..Address::default()
            },
        }
    }

    fn update_from(customer: &Customer, email: &str) -> CustomerUpdate {
        CustomerUpdate {
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: email.into(),
            phone_number: customer.phone_number.clone(),
            address: customer.address.clone(),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let service = service();
        let created = service.create(input("grace@navy.mil")).await.unwrap();

        assert_eq!(service.get(created.id).await.unwrap(), created);
        assert_eq!(
            service.get_by_email("grace@navy.mil").await.unwrap().id,
            created.id
        );
        assert_eq!(service.list(10, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let service = service();
        service.create(input("grace@navy.mil")).await.unwrap();

        let err = service.create(input("grace@navy.mil")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_update_to_taken_email_rejected() {
        let service = service();
        let grace = service.create(input("grace@navy.mil")).await.unwrap();
        service.create(input("other@navy.mil")).await.unwrap();

        let err = service
            .update(grace.id, update_from(&grace, "other@navy.mil"))
            .await
            .unwrap_err();
        assert!(matches!(err, BankingError::CustomerExists(_)));

        let updated = service
            .update(grace.id, update_from(&grace, "hopper@navy.mil"))
            .await
            .unwrap();
        assert_eq!(updated.email, "hopper@navy.mil");
    }

    #[tokio::test]
    async fn test_update_status() {
        let service = service();
        let grace = service.create(input("grace@navy.mil")).await.unwrap();
        let blocked = service
            .update_status(grace.id, CustomerStatus::Blocked)
            .await
            .unwrap();
        assert!(!blocked.is_active());
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let service = service();
        let err = service.create(input("not-an-email")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
