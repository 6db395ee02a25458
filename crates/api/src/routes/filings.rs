//! Tax filing routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;
use tally_core::treasury::{
    FilingAmounts, FilingPeriod, FilingStatus, NewTaxFiling, TaxFiling, TaxPayment,
};
use tally_shared::types::{MinorUnits, PageRequest, PageResponse, TaxFilingId};

use super::ReasonRequest;
use crate::{
    AppState,
    error::{ApiError, ApiResult},
};

/// Creates the filing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/filings", get(list_filings).post(create_filing))
        .route("/filings/overdue", get(list_overdue))
        .route("/filings/{id}", get(get_filing))
        .route("/filings/{id}/amounts", put(update_amounts))
        .route("/filings/{id}/deductions", post(add_deduction))
        .route("/filings/{id}/credits", post(add_credit))
        .route("/filings/{id}/submit", post(submit_filing))
        .route("/filings/{id}/process", post(process_filing))
        .route("/filings/{id}/accept", post(accept_filing))
        .route("/filings/{id}/reject", post(reject_filing))
        .route("/filings/{id}/amend", post(amend_filing))
        .route("/filings/{id}/payments", get(list_payments))
}

/// Filters for listing filings. At most one applies, in field order.
#[derive(Debug, Default, Deserialize)]
pub struct FilingFilter {
    /// Only filings in this status.
    pub status: Option<FilingStatus>,
    /// Only filings of this tax year.
    pub tax_year: Option<i32>,
    /// Narrows `tax_year` to one period kind.
    pub period: Option<FilingPeriod>,
    /// Only filings submitted within this many days.
    pub submitted_within_days: Option<u32>,
}

/// Request body for a deduction or credit.
#[derive(Debug, Deserialize)]
pub struct AdjustmentRequest {
    /// Statutory code.
    pub code: String,
    /// Free text description.
    #[serde(default)]
    pub description: String,
    /// Amount in minor units; must be positive.
    pub amount: MinorUnits,
}

/// Request body for starting assessment.
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    /// Tax owed, in minor units.
    pub tax_calculated: MinorUnits,
}

/// GET `/filings` - List filings, optionally filtered.
async fn list_filings(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
    Query(filter): Query<FilingFilter>,
) -> ApiResult<Json<PageResponse<TaxFiling>>> {
    let filings = &state.services.filings;
    let found = match filter {
        FilingFilter {
            status: Some(status),
            ..
        } => filings.list_by_status(status).await?,
        FilingFilter {
            tax_year: Some(tax_year),
            period: Some(period),
            ..
        } => filings.list_by_period(tax_year, period).await?,
        FilingFilter {
            tax_year: Some(_),
            period: None,
            ..
        } => {
            return Err(ApiError::validation(
                "tax_year must be combined with period",
            ));
        }
        FilingFilter {
            submitted_within_days: Some(days),
            ..
        } => filings.list_recently_submitted(days).await?,
        FilingFilter { .. } => filings.list(page.limit(), page.offset()).await?,
    };
    Ok(Json(PageResponse::new(found, page)))
}

/// GET `/filings/overdue` - Filings past due and still open.
async fn list_overdue(State(state): State<AppState>) -> ApiResult<Json<Vec<TaxFiling>>> {
    Ok(Json(state.services.filings.list_overdue().await?))
}

/// POST `/filings` - Open a draft filing.
async fn create_filing(
    State(state): State<AppState>,
    Json(payload): Json<NewTaxFiling>,
) -> ApiResult<(StatusCode, Json<TaxFiling>)> {
    let filing = state.services.filings.create(payload).await?;
    Ok((StatusCode::CREATED, Json(filing)))
}

async fn get_filing(
    State(state): State<AppState>,
    Path(id): Path<TaxFilingId>,
) -> ApiResult<Json<TaxFiling>> {
    Ok(Json(state.services.filings.get(id).await?))
}

async fn update_amounts(
    State(state): State<AppState>,
    Path(id): Path<TaxFilingId>,
    Json(payload): Json<FilingAmounts>,
) -> ApiResult<Json<TaxFiling>> {
    Ok(Json(
        state.services.filings.update_amounts(id, payload).await?,
    ))
}

async fn add_deduction(
    State(state): State<AppState>,
    Path(id): Path<TaxFilingId>,
    Json(payload): Json<AdjustmentRequest>,
) -> ApiResult<Json<TaxFiling>> {
    Ok(Json(
        state
            .services
            .filings
            .add_deduction(id, &payload.code, &payload.description, payload.amount)
            .await?,
    ))
}

async fn add_credit(
    State(state): State<AppState>,
    Path(id): Path<TaxFilingId>,
    Json(payload): Json<AdjustmentRequest>,
) -> ApiResult<Json<TaxFiling>> {
    Ok(Json(
        state
            .services
            .filings
            .add_credit(id, &payload.code, &payload.description, payload.amount)
            .await?,
    ))
}

async fn submit_filing(
    State(state): State<AppState>,
    Path(id): Path<TaxFilingId>,
) -> ApiResult<Json<TaxFiling>> {
    Ok(Json(state.services.filings.submit(id).await?))
}

async fn process_filing(
    State(state): State<AppState>,
    Path(id): Path<TaxFilingId>,
    Json(payload): Json<ProcessRequest>,
) -> ApiResult<Json<TaxFiling>> {
    Ok(Json(
        state
            .services
            .filings
            .process(id, payload.tax_calculated)
            .await?,
    ))
}

async fn accept_filing(
    State(state): State<AppState>,
    Path(id): Path<TaxFilingId>,
) -> ApiResult<Json<TaxFiling>> {
    Ok(Json(state.services.filings.accept(id).await?))
}

async fn reject_filing(
    State(state): State<AppState>,
    Path(id): Path<TaxFilingId>,
    Json(payload): Json<ReasonRequest>,
) -> ApiResult<Json<TaxFiling>> {
    Ok(Json(
        state.services.filings.reject(id, &payload.reason).await?,
    ))
}

async fn amend_filing(
    State(state): State<AppState>,
    Path(id): Path<TaxFilingId>,
) -> ApiResult<Json<TaxFiling>> {
    Ok(Json(state.services.filings.amend(id).await?))
}

async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<TaxFilingId>,
) -> ApiResult<Json<Vec<TaxPayment>>> {
    Ok(Json(state.services.payments.list_by_filing(id).await?))
}
