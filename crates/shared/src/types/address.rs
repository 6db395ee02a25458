//! Postal address shared by customers and taxpayers.

use serde::{Deserialize, Serialize};

/// A physical address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street and house number.
    pub street: String,
    /// City.
    pub city: String,
    /// State or province.
    pub state: String,
    /// Country.
    pub country: String,
    /// Postal or ZIP code.
    pub postal_code: String,
}
