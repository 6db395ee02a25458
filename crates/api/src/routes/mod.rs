//! API route definitions.

use axum::Router;
use serde::Deserialize;
use tally_shared::types::MinorUnits;

use crate::AppState;

pub mod accounts;
pub mod customers;
pub mod filings;
pub mod health;
pub mod payments;
pub mod reports;
pub mod tax_rates;
pub mod taxpayers;
pub mod transactions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(customers::routes())
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(tax_rates::routes())
        .merge(taxpayers::routes())
        .merge(filings::routes())
        .merge(payments::routes())
        .merge(reports::routes())
}

/// Request body carrying a free-text reason.
#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    /// Why the action was taken.
    #[serde(default)]
    pub reason: String,
}

/// Request body carrying an amount in minor units.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    /// Amount in minor units.
    pub amount: MinorUnits,
}
