//! Tax payment routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally_core::treasury::{NewTaxPayment, PaymentStatus, TaxPayment, TaxType};
use tally_shared::types::{MinorUnits, PageRequest, PageResponse, TaxPaymentId};

use super::{AmountRequest, ReasonRequest};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
};

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments).post(create_payment))
        .route("/payments/totals", get(total_by_tax_type))
        .route("/payments/confirmation/{code}", get(get_by_confirmation_code))
        .route("/payments/{id}", get(get_payment))
        .route("/payments/{id}/process", post(process_payment))
        .route("/payments/{id}/fail", post(fail_payment))
        .route("/payments/{id}/refund", post(refund_payment))
        .route("/payments/{id}/void", post(void_payment))
        .route("/payments/{id}/amount", put(update_amount))
}

/// Filters for listing payments. At most one applies, in field order.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentFilter {
    /// Only payments in this status.
    pub status: Option<PaymentStatus>,
    /// Value date range start; requires `to`.
    pub from: Option<NaiveDate>,
    /// Value date range end; requires `from`.
    pub to: Option<NaiveDate>,
    /// Only payments recorded within this many days.
    pub recent_days: Option<u32>,
}

/// Query parameters for the per-type total.
#[derive(Debug, Deserialize)]
pub struct TotalQuery {
    /// Kind of tax.
    pub tax_type: TaxType,
    /// Range start, inclusive.
    pub from: NaiveDate,
    /// Range end, inclusive.
    pub to: NaiveDate,
}

/// Completed payment total for one kind of tax.
#[derive(Debug, Serialize)]
pub struct TotalResponse {
    /// Kind of tax.
    pub tax_type: TaxType,
    /// Range start.
    pub from: NaiveDate,
    /// Range end.
    pub to: NaiveDate,
    /// Sum in minor units.
    pub total: MinorUnits,
}

/// GET `/payments` - List payments, optionally filtered.
async fn list_payments(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
    Query(filter): Query<PaymentFilter>,
) -> ApiResult<Json<PageResponse<TaxPayment>>> {
    let payments = &state.services.payments;
    let found = match filter {
        PaymentFilter {
            status: Some(status),
            ..
        } => payments.list_by_status(status).await?,
        PaymentFilter {
            from: Some(from),
            to: Some(to),
            ..
        } => payments.list_by_date_range(from, to).await?,
        PaymentFilter { from: Some(_), .. } | PaymentFilter { to: Some(_), .. } => {
            return Err(ApiError::validation("from and to must be given together"));
        }
        PaymentFilter {
            recent_days: Some(days),
            ..
        } => payments.list_recent(days).await?,
        PaymentFilter { .. } => payments.list(page.limit(), page.offset()).await?,
    };
    Ok(Json(PageResponse::new(found, page)))
}

/// GET `/payments/totals?tax_type=&from=&to=` - Completed payments summed.
async fn total_by_tax_type(
    State(state): State<AppState>,
    Query(query): Query<TotalQuery>,
) -> ApiResult<Json<TotalResponse>> {
    let total = state
        .services
        .payments
        .total_by_tax_type(query.tax_type, query.from, query.to)
        .await?;
    Ok(Json(TotalResponse {
        tax_type: query.tax_type,
        from: query.from,
        to: query.to,
        total,
    }))
}

/// POST `/payments` - Record a pending payment.
async fn create_payment(
    State(state): State<AppState>,
    Json(payload): Json<NewTaxPayment>,
) -> ApiResult<(StatusCode, Json<TaxPayment>)> {
    let payment = state.services.payments.create(payload).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<TaxPaymentId>,
) -> ApiResult<Json<TaxPayment>> {
    Ok(Json(state.services.payments.get(id).await?))
}

async fn get_by_confirmation_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<TaxPayment>> {
    Ok(Json(
        state
            .services
            .payments
            .get_by_confirmation_code(&code)
            .await?,
    ))
}

/// POST `/payments/{id}/process` - Complete a pending payment.
async fn process_payment(
    State(state): State<AppState>,
    Path(id): Path<TaxPaymentId>,
) -> ApiResult<Json<TaxPayment>> {
    Ok(Json(state.services.payments.process(id).await?))
}

async fn fail_payment(
    State(state): State<AppState>,
    Path(id): Path<TaxPaymentId>,
    Json(payload): Json<ReasonRequest>,
) -> ApiResult<Json<TaxPayment>> {
    Ok(Json(
        state
            .services
            .payments
            .mark_failed(id, &payload.reason)
            .await?,
    ))
}

async fn refund_payment(
    State(state): State<AppState>,
    Path(id): Path<TaxPaymentId>,
    Json(payload): Json<ReasonRequest>,
) -> ApiResult<Json<TaxPayment>> {
    Ok(Json(
        state.services.payments.refund(id, &payload.reason).await?,
    ))
}

async fn void_payment(
    State(state): State<AppState>,
    Path(id): Path<TaxPaymentId>,
    Json(payload): Json<ReasonRequest>,
) -> ApiResult<Json<TaxPayment>> {
    Ok(Json(
        state.services.payments.void(id, &payload.reason).await?,
    ))
}

async fn update_amount(
    State(state): State<AppState>,
    Path(id): Path<TaxPaymentId>,
    Json(payload): Json<AmountRequest>,
) -> ApiResult<Json<TaxPayment>> {
    Ok(Json(
        state
            .services
            .payments
            .update_amount(id, payload.amount)
            .await?,
    ))
}
