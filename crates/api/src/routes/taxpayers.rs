//! Taxpayer registry routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use tally_core::treasury::{
    BusinessInfo, NewTaxpayer, TaxFiling, TaxPayment, Taxpayer, TaxpayerStatus, TaxpayerType,
};
use tally_shared::types::{Address, PageRequest, PageResponse, TaxpayerId};

use crate::{AppState, error::ApiResult};

/// Creates the taxpayer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/taxpayers", get(list_taxpayers).post(create_taxpayer))
        .route(
            "/taxpayers/identifier/{tax_identifier}",
            get(get_by_tax_identifier),
        )
        .route("/taxpayers/{id}", get(get_taxpayer))
        .route("/taxpayers/{id}/status", put(update_status))
        .route("/taxpayers/{id}/contact", put(update_contact))
        .route("/taxpayers/{id}/address", put(update_address))
        .route("/taxpayers/{id}/business", put(update_business_info))
        .route("/taxpayers/{id}/exemptions", post(add_exemption))
        .route("/taxpayers/{id}/exemptions/{code}", delete(remove_exemption))
        .route("/taxpayers/{id}/filings", get(list_filings))
        .route("/taxpayers/{id}/payments", get(list_payments))
}

/// Filters for listing taxpayers. At most one applies, in field order.
#[derive(Debug, Default, Deserialize)]
pub struct TaxpayerFilter {
    /// Case-insensitive search over name, identifier and email.
    pub q: Option<String>,
    /// Only taxpayers of this kind.
    pub taxpayer_type: Option<TaxpayerType>,
    /// Only taxpayers in this standing.
    pub status: Option<TaxpayerStatus>,
    /// Only businesses of this industry.
    pub industry: Option<String>,
}

/// Request body for changing a taxpayer's standing.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// New standing.
    pub status: TaxpayerStatus,
}

/// Request body for replacing contact details.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: String,
}

/// Request body for adding an exemption.
#[derive(Debug, Deserialize)]
pub struct ExemptionRequest {
    /// Exemption code.
    pub code: String,
}

/// GET `/taxpayers` - List or search taxpayers.
async fn list_taxpayers(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
    Query(filter): Query<TaxpayerFilter>,
) -> ApiResult<Json<PageResponse<Taxpayer>>> {
    let taxpayers = &state.services.taxpayers;
    let found = if let Some(q) = filter.q {
        taxpayers.search(&q, page.limit()).await?
    } else if let Some(taxpayer_type) = filter.taxpayer_type {
        taxpayers.list_by_type(taxpayer_type).await?
    } else if let Some(status) = filter.status {
        taxpayers.list_by_status(status).await?
    } else if let Some(industry) = filter.industry {
        taxpayers.list_businesses_by_industry(&industry).await?
    } else {
        taxpayers.list(page.limit(), page.offset()).await?
    };
    Ok(Json(PageResponse::new(found, page)))
}

/// POST `/taxpayers` - Register a taxpayer.
async fn create_taxpayer(
    State(state): State<AppState>,
    Json(payload): Json<NewTaxpayer>,
) -> ApiResult<(StatusCode, Json<Taxpayer>)> {
    let taxpayer = state.services.taxpayers.create(payload).await?;
    Ok((StatusCode::CREATED, Json(taxpayer)))
}

async fn get_taxpayer(
    State(state): State<AppState>,
    Path(id): Path<TaxpayerId>,
) -> ApiResult<Json<Taxpayer>> {
    Ok(Json(state.services.taxpayers.get(id).await?))
}

async fn get_by_tax_identifier(
    State(state): State<AppState>,
    Path(tax_identifier): Path<String>,
) -> ApiResult<Json<Taxpayer>> {
    Ok(Json(
        state
            .services
            .taxpayers
            .get_by_tax_identifier(&tax_identifier)
            .await?,
    ))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<TaxpayerId>,
    Json(payload): Json<StatusRequest>,
) -> ApiResult<Json<Taxpayer>> {
    Ok(Json(
        state
            .services
            .taxpayers
            .update_status(id, payload.status)
            .await?,
    ))
}

async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<TaxpayerId>,
    Json(payload): Json<ContactRequest>,
) -> ApiResult<Json<Taxpayer>> {
    Ok(Json(
        state
            .services
            .taxpayers
            .update_contact(id, payload.email, payload.phone)
            .await?,
    ))
}

async fn update_address(
    State(state): State<AppState>,
    Path(id): Path<TaxpayerId>,
    Json(payload): Json<Address>,
) -> ApiResult<Json<Taxpayer>> {
    Ok(Json(
        state.services.taxpayers.update_address(id, payload).await?,
    ))
}

async fn update_business_info(
    State(state): State<AppState>,
    Path(id): Path<TaxpayerId>,
    Json(payload): Json<BusinessInfo>,
) -> ApiResult<Json<Taxpayer>> {
    Ok(Json(
        state
            .services
            .taxpayers
            .update_business_info(id, payload)
            .await?,
    ))
}

/// POST `/taxpayers/{id}/exemptions` - Grant an exemption code.
async fn add_exemption(
    State(state): State<AppState>,
    Path(id): Path<TaxpayerId>,
    Json(payload): Json<ExemptionRequest>,
) -> ApiResult<Json<Taxpayer>> {
    Ok(Json(
        state
            .services
            .taxpayers
            .add_exemption(id, &payload.code)
            .await?,
    ))
}

/// DELETE `/taxpayers/{id}/exemptions/{code}` - Withdraw an exemption code.
async fn remove_exemption(
    State(state): State<AppState>,
    Path((id, code)): Path<(TaxpayerId, String)>,
) -> ApiResult<Json<Taxpayer>> {
    Ok(Json(
        state.services.taxpayers.remove_exemption(id, &code).await?,
    ))
}

async fn list_filings(
    State(state): State<AppState>,
    Path(id): Path<TaxpayerId>,
) -> ApiResult<Json<Vec<TaxFiling>>> {
    Ok(Json(state.services.filings.list_by_taxpayer(id).await?))
}

async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<TaxpayerId>,
) -> ApiResult<Json<Vec<TaxPayment>>> {
    Ok(Json(state.services.payments.list_by_taxpayer(id).await?))
}
