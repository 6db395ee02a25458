//! Account management and money movement routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tally_core::banking::{Account, NewAccount, Transaction};
use tally_shared::types::{AccountId, MinorUnits, PageRequest, PageResponse};
use tracing::info;

use crate::{AppState, error::ApiResult};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{id}", get(get_account).put(rename_account))
        .route("/accounts/{id}/deposit", post(deposit))
        .route("/accounts/{id}/withdraw", post(withdraw))
        .route("/accounts/{id}/transfer", post(transfer))
        .route("/accounts/{id}/close", post(close_account))
        .route("/accounts/{id}/deactivate", post(deactivate_account))
        .route("/accounts/{id}/reactivate", post(reactivate_account))
        .route("/accounts/{id}/transactions", get(list_transactions))
}

/// Request body for renaming an account.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    /// New display name.
    pub name: String,
}

/// Request body for a deposit or withdrawal.
#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    /// Amount in minor units; must be positive.
    pub amount: MinorUnits,
    /// Free text description.
    #[serde(default)]
    pub description: String,
}

/// Request body for a transfer out of the path account.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Account receiving the funds.
    pub target_account_id: AccountId,
    /// Amount in minor units; must be positive.
    pub amount: MinorUnits,
    /// Free text description.
    #[serde(default)]
    pub description: String,
}

/// GET `/accounts` - List accounts.
async fn list_accounts(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<Account>>> {
    let accounts = state
        .services
        .accounts
        .list(page.limit(), page.offset())
        .await?;
    Ok(Json(PageResponse::new(accounts, page)))
}

/// POST `/accounts` - Open an account for an existing customer.
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<NewAccount>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    let account = state.services.accounts.create(payload).await?;
    info!(account_id = %account.id, customer_id = %account.customer_id, "Account opened");
    Ok((StatusCode::CREATED, Json(account)))
}

async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> ApiResult<Json<Account>> {
    Ok(Json(state.services.accounts.get(id).await?))
}

async fn rename_account(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
    Json(payload): Json<RenameRequest>,
) -> ApiResult<Json<Account>> {
    Ok(Json(
        state.services.accounts.rename(id, &payload.name).await?,
    ))
}

/// POST `/accounts/{id}/deposit` - Credit an account.
async fn deposit(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
    Json(payload): Json<MovementRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let tx = state
        .services
        .accounts
        .deposit(id, payload.amount, &payload.description)
        .await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

/// POST `/accounts/{id}/withdraw` - Debit an account.
async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
    Json(payload): Json<MovementRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let tx = state
        .services
        .accounts
        .withdraw(id, payload.amount, &payload.description)
        .await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

/// POST `/accounts/{id}/transfer` - Move funds to another account.
async fn transfer(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
    Json(payload): Json<TransferRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let tx = state
        .services
        .accounts
        .transfer(
            id,
            payload.target_account_id,
            payload.amount,
            &payload.description,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

async fn close_account(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> ApiResult<Json<Account>> {
    Ok(Json(state.services.accounts.close(id).await?))
}

async fn deactivate_account(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> ApiResult<Json<Account>> {
    Ok(Json(state.services.accounts.deactivate(id).await?))
}

async fn reactivate_account(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> ApiResult<Json<Account>> {
    Ok(Json(state.services.accounts.reactivate(id).await?))
}

/// GET `/accounts/{id}/transactions` - Transactions touching the account,
/// newest first.
async fn list_transactions(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<Transaction>>> {
    let transactions = state
        .services
        .transactions
        .list_by_account(id, page.limit(), page.offset())
        .await?;
    Ok(Json(PageResponse::new(transactions, page)))
}
