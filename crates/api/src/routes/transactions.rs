//! Transaction routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tally_core::banking::{Transaction, TransactionType};
use tally_shared::types::{AccountId, MinorUnits, PageRequest, PageResponse, TransactionId};

use crate::{AppState, error::ApiResult};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/transactions/reference/{reference}", get(get_by_reference))
        .route("/transactions/{id}", get(get_transaction))
        .route("/transactions/{id}/reverse", post(reverse_transaction))
}

/// Request body for a single-account transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Deposit, withdrawal, fee or interest.
    pub transaction_type: TransactionType,
    /// Account the transaction applies to.
    pub account_id: AccountId,
    /// Amount in minor units; must be positive.
    pub amount: MinorUnits,
    /// Free text description.
    #[serde(default)]
    pub description: String,
}

async fn list_transactions(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<Transaction>>> {
    let transactions = state
        .services
        .transactions
        .list(page.limit(), page.offset())
        .await?;
    Ok(Json(PageResponse::new(transactions, page)))
}

/// POST `/transactions` - Record and apply a transaction.
async fn create_transaction(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let tx = state
        .services
        .transactions
        .create_transaction(
            payload.transaction_type,
            payload.account_id,
            payload.amount,
            &payload.description,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<TransactionId>,
) -> ApiResult<Json<Transaction>> {
    Ok(Json(state.services.transactions.get(id).await?))
}

async fn get_by_reference(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> ApiResult<Json<Transaction>> {
    Ok(Json(
        state
            .services
            .transactions
            .get_by_reference(&reference)
            .await?,
    ))
}

/// POST `/transactions/{id}/reverse` - Cancel a pending transaction.
async fn reverse_transaction(
    State(state): State<AppState>,
    Path(id): Path<TransactionId>,
) -> ApiResult<Json<Transaction>> {
    Ok(Json(
        state.services.transactions.reverse_transaction(id).await?,
    ))
}
