//! Treasury report routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tally_core::treasury::report::{
    FilingStatusReport, RevenueReport, TaxTypeBreakdownReport, TaxpayerComplianceReport,
};

use crate::{AppState, error::ApiResult};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/revenue", get(revenue_report))
        .route("/reports/filing-status", get(filing_status_report))
        .route("/reports/compliance", get(compliance_report))
        .route("/reports/tax-types", get(tax_type_breakdown))
}

/// Inclusive date range.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// Start date (YYYY-MM-DD).
    pub start: NaiveDate,
    /// End date (YYYY-MM-DD).
    pub end: NaiveDate,
}

/// Query parameters for the filing status report.
#[derive(Debug, Deserialize)]
pub struct YearQuery {
    /// Tax year.
    pub tax_year: i32,
}

/// GET `/reports/revenue?start=&end=` - Completed payments by type, month and
/// taxpayer.
async fn revenue_report(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> ApiResult<Json<RevenueReport>> {
    Ok(Json(
        state
            .services
            .reports
            .revenue_report(range.start, range.end)
            .await?,
    ))
}

/// GET `/reports/filing-status?tax_year=` - Filing counts for a year.
async fn filing_status_report(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> ApiResult<Json<FilingStatusReport>> {
    Ok(Json(
        state
            .services
            .reports
            .filing_status_report(query.tax_year)
            .await?,
    ))
}

async fn compliance_report(
    State(state): State<AppState>,
) -> ApiResult<Json<TaxpayerComplianceReport>> {
    Ok(Json(state.services.reports.compliance_report().await?))
}

async fn tax_type_breakdown(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> ApiResult<Json<TaxTypeBreakdownReport>> {
    Ok(Json(
        state
            .services
            .reports
            .tax_type_breakdown(range.start, range.end)
            .await?,
    ))
}
