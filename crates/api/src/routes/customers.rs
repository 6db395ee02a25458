//! Customer routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use tally_core::banking::{Account, Customer, CustomerStatus, CustomerUpdate, NewCustomer};
use tally_shared::types::{CustomerId, PageRequest, PageResponse};

use crate::{AppState, error::ApiResult};

/// Creates the customer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/lookup", get(find_by_email))
        .route("/customers/{id}", get(get_customer).put(update_customer))
        .route("/customers/{id}/status", put(update_status))
        .route("/customers/{id}/accounts", get(list_accounts))
}

/// Query parameters for looking a customer up by email.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    /// Email address to match.
    pub email: String,
}

/// Request body for changing a customer's status.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// New status.
    pub status: CustomerStatus,
}

/// GET `/customers` - List customers.
async fn list_customers(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<Customer>>> {
    let customers = state
        .services
        .customers
        .list(page.limit(), page.offset())
        .await?;
    Ok(Json(PageResponse::new(customers, page)))
}

/// POST `/customers` - Register a customer.
async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = state.services.customers.create(payload).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET `/customers/lookup?email=` - Find a customer by email.
async fn find_by_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(
        state.services.customers.get_by_email(&query.email).await?,
    ))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.services.customers.get(id).await?))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
    Json(payload): Json<CustomerUpdate>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.services.customers.update(id, payload).await?))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
    Json(payload): Json<StatusRequest>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(
        state
            .services
            .customers
            .update_status(id, payload.status)
            .await?,
    ))
}

/// GET `/customers/{id}/accounts` - Every account the customer owns.
async fn list_accounts(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> ApiResult<Json<Vec<Account>>> {
    Ok(Json(state.services.accounts.list_by_customer(id).await?))
}
