//! Customer entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{Address, CustomerId};

use crate::banking::types::{CustomerStatus, NewCustomer};

/// A bank customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Identifier.
    pub id: CustomerId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email (unique).
    pub email: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Postal address.
    pub address: Address,
    /// Current status.
    pub status: CustomerStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Registers a new active customer.
    #[must_use]
    pub fn new(input: NewCustomer) -> Self {
        let now = Utc::now();
        Self {
            id: CustomerId::new(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone_number: input.phone_number,
            address: input.address,
            status: CustomerStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// First and last name separated by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns true if the customer may transact.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == CustomerStatus::Active
    }

    /// Sets the status.
    pub fn update_status(&mut self, status: CustomerStatus) {
        self.status = status;
        self.touch();
    }

    /// Replaces the postal address.
    pub fn update_address(&mut self, address: Address) {
        self.address = address;
        self.touch();
    }

    /// Replaces email and phone number.
    pub fn update_contact(&mut self, email: String, phone_number: String) {
        self.email = email;
        self.phone_number = phone_number;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
