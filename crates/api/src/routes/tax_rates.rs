//! Tax rate routes and tax calculators.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tally_core::treasury::{NewTaxRate, TaxRate, TaxRateUpdate, TaxType};
use tally_shared::types::{MinorUnits, PageRequest, PageResponse, TaxRateId};

use crate::{AppState, error::ApiResult};

/// Creates the tax rate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tax-rates", get(list_rates).post(create_rate))
        .route("/tax-rates/income", get(rates_for_income))
        .route("/tax-rates/calculate/income", post(calculate_income_tax))
        .route("/tax-rates/calculate/sales", post(calculate_sales_tax))
        .route("/tax-rates/{id}", get(get_rate).put(update_rate))
        .route("/tax-rates/{id}/activate", post(activate_rate))
        .route("/tax-rates/{id}/deactivate", post(deactivate_rate))
        .route("/tax-rates/{id}/archive", post(archive_rate))
}

/// Filters for listing tax rates. At most one applies, in field order.
#[derive(Debug, Default, Deserialize)]
pub struct RateFilter {
    /// Only rates of this kind of tax.
    pub tax_type: Option<TaxType>,
    /// Only rates of this jurisdiction.
    pub jurisdiction: Option<String>,
    /// Only active rates in effect today.
    pub active: Option<bool>,
}

/// Query parameters for income band lookup.
#[derive(Debug, Deserialize)]
pub struct IncomeQuery {
    /// Jurisdiction code.
    pub jurisdiction: String,
    /// Income in minor units.
    pub amount: MinorUnits,
}

/// Request body for the income tax calculator.
#[derive(Debug, Deserialize)]
pub struct IncomeTaxRequest {
    /// Jurisdiction code.
    pub jurisdiction_code: String,
    /// Income in minor units.
    pub income: MinorUnits,
}

/// Request body for the sales tax calculator.
#[derive(Debug, Deserialize)]
pub struct SalesTaxRequest {
    /// Jurisdiction code.
    pub jurisdiction_code: String,
    /// Sale amount in minor units.
    pub amount: MinorUnits,
    /// Optional product category.
    #[serde(default)]
    pub category: Option<String>,
}

/// Result of a tax calculation.
#[derive(Debug, Serialize)]
pub struct TaxAmountResponse {
    /// Jurisdiction the tax was computed for.
    pub jurisdiction_code: String,
    /// Amount the tax was computed on.
    pub amount: MinorUnits,
    /// Tax due in minor units.
    pub tax: MinorUnits,
}

/// GET `/tax-rates` - List tax rates, optionally filtered.
async fn list_rates(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
    Query(filter): Query<RateFilter>,
) -> ApiResult<Json<PageResponse<TaxRate>>> {
    let rates = &state.services.tax_rates;
    let found = if let Some(tax_type) = filter.tax_type {
        rates.list_by_type(tax_type).await?
    } else if let Some(jurisdiction) = filter.jurisdiction {
        rates.list_by_jurisdiction(&jurisdiction).await?
    } else if filter.active == Some(true) {
        rates.list_active().await?
    } else {
        rates.list(page.limit(), page.offset()).await?
    };
    Ok(Json(PageResponse::new(found, page)))
}

/// POST `/tax-rates` - Propose a new rate.
async fn create_rate(
    State(state): State<AppState>,
    Json(payload): Json<NewTaxRate>,
) -> ApiResult<(StatusCode, Json<TaxRate>)> {
    let rate = state.services.tax_rates.create(payload).await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

/// GET `/tax-rates/income?jurisdiction=&amount=` - Income rates whose band
/// contains the amount.
async fn rates_for_income(
    State(state): State<AppState>,
    Query(query): Query<IncomeQuery>,
) -> ApiResult<Json<Vec<TaxRate>>> {
    Ok(Json(
        state
            .services
            .tax_rates
            .rates_for_income(&query.jurisdiction, query.amount)
            .await?,
    ))
}

/// POST `/tax-rates/calculate/income` - Income tax owed on an income.
async fn calculate_income_tax(
    State(state): State<AppState>,
    Json(payload): Json<IncomeTaxRequest>,
) -> ApiResult<Json<TaxAmountResponse>> {
    let tax = state
        .services
        .tax_rates
        .calculate_income_tax(&payload.jurisdiction_code, payload.income)
        .await?;
    Ok(Json(TaxAmountResponse {
        jurisdiction_code: payload.jurisdiction_code,
        amount: payload.income,
        tax,
    }))
}

/// POST `/tax-rates/calculate/sales` - Sales tax owed on a sale.
async fn calculate_sales_tax(
    State(state): State<AppState>,
    Json(payload): Json<SalesTaxRequest>,
) -> ApiResult<Json<TaxAmountResponse>> {
    let tax = state
        .services
        .tax_rates
        .calculate_sales_tax(
            &payload.jurisdiction_code,
            payload.amount,
            payload.category.as_deref(),
        )
        .await?;
    Ok(Json(TaxAmountResponse {
        jurisdiction_code: payload.jurisdiction_code,
        amount: payload.amount,
        tax,
    }))
}

async fn get_rate(
    State(state): State<AppState>,
    Path(id): Path<TaxRateId>,
) -> ApiResult<Json<TaxRate>> {
    Ok(Json(state.services.tax_rates.get(id).await?))
}

async fn update_rate(
    State(state): State<AppState>,
    Path(id): Path<TaxRateId>,
    Json(payload): Json<TaxRateUpdate>,
) -> ApiResult<Json<TaxRate>> {
    Ok(Json(state.services.tax_rates.update(id, payload).await?))
}

async fn activate_rate(
    State(state): State<AppState>,
    Path(id): Path<TaxRateId>,
) -> ApiResult<Json<TaxRate>> {
    Ok(Json(state.services.tax_rates.activate(id).await?))
}

async fn deactivate_rate(
    State(state): State<AppState>,
    Path(id): Path<TaxRateId>,
) -> ApiResult<Json<TaxRate>> {
    Ok(Json(state.services.tax_rates.deactivate(id).await?))
}

async fn archive_rate(
    State(state): State<AppState>,
    Path(id): Path<TaxRateId>,
) -> ApiResult<Json<TaxRate>> {
    Ok(Json(state.services.tax_rates.archive(id).await?))
}
