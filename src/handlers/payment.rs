//! Payment Handlers
//!
//! Writes carry the `version` the client last read; a stale version is a 409.

use axum::{Json, extract::State, http::StatusCode};

use crate::AppState;
use crate::auth::access::Principal;
use crate::entities::payments;
use crate::error::ApiError;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::payment::{
    CreatePaymentRequest, PaymentFailureRequest, PaymentStatusRequest, PaymentTotals, TotalsQuery,
    UpdatePaymentRequest,
};
use crate::models::property::ExpiringQuery;
use crate::queries::pagination::{Page, PageRequest};
use crate::queries::payment::PaymentFilter;

type PaymentPage = Json<Page<payments::Model>>;

/// GET /api/payments
pub async fn list_payments(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<PaymentPage, ApiError> {
    Ok(Json(state.payments.list(&principal, &page).await?))
}

/// GET /api/payments/{id}
pub async fn get_payment(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<payments::Model>, ApiError> {
    Ok(Json(state.payments.get(&principal, id).await?))
}

/// POST /api/payments
pub async fn create_payment(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(request): ApiJson<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<payments::Model>), ApiError> {
    let created = state.payments.create(&principal, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/payments/{id}
pub async fn update_payment(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<UpdatePaymentRequest>,
) -> Result<Json<payments::Model>, ApiError> {
    Ok(Json(state.payments.update(&principal, id, patch).await?))
}

/// DELETE /api/payments/{id}
pub async fn delete_payment(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    state.payments.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/payments/search
pub async fn search_payments(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(filter): ApiQuery<PaymentFilter>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<PaymentPage, ApiError> {
    Ok(Json(state.payments.search(&principal, filter, &page).await?))
}

/// GET /api/payments/count
pub async fn count_payments(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(filter): ApiQuery<PaymentFilter>,
) -> Result<Json<u64>, ApiError> {
    Ok(Json(state.payments.count(&principal, filter).await?))
}

/// PATCH /api/payments/{id}/status
pub async fn update_payment_status(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<PaymentStatusRequest>,
) -> Result<Json<payments::Model>, ApiError> {
    Ok(Json(state.payments.update_status(&principal, id, request).await?))
}

/// POST /api/payments/{id}/failure
pub async fn record_payment_failure(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<PaymentFailureRequest>,
) -> Result<Json<payments::Model>, ApiError> {
    Ok(Json(state.payments.record_failure(&principal, id, request).await?))
}

/// GET /api/payments/overdue
pub async fn overdue_payments(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<PaymentPage, ApiError> {
    Ok(Json(state.payments.overdue(&principal, &page).await?))
}

/// GET /api/payments/due-soon?days=7
pub async fn payments_due_soon(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<ExpiringQuery>,
) -> Result<Json<Vec<payments::Model>>, ApiError> {
    Ok(Json(state.payments.due_soon(&principal, query.days).await?))
}

/// GET /api/payments/retry-due
pub async fn payments_retry_due(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<PaymentPage, ApiError> {
    Ok(Json(state.payments.retry_due(&principal, &page).await?))
}

/// GET /api/payments/totals?status=COMPLETED&tenantId=3
pub async fn payment_totals(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<TotalsQuery>,
) -> Result<Json<PaymentTotals>, ApiError> {
    Ok(Json(state.payments.totals(&principal, query).await?))
}
