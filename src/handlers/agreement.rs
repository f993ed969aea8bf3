//! Agreement Handlers

use axum::{Json, extract::State, http::StatusCode};


use crate::AppState;
use crate::auth::access::Principal;
use crate::entities::agreements;
use crate::error::ApiError;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::agreement::{
    AgreementStatusRequest, CreateAgreementRequest, ExpiringAgreementsQuery, SignRequest, TerminateRequest,
    UpdateAgreementRequest,
};
use crate::models::property::ExpiringQuery;
use crate::queries::agreement::AgreementFilter;
use crate::queries::pagination::{Page, PageRequest};

type AgreementPage = Json<Page<agreements::Model>>;

/// GET /api/agreements
pub async fn list_agreements(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<AgreementPage, ApiError> {
    Ok(Json(state.agreements.list(&principal, &page).await?))
}

/// GET /api/agreements/{id}
pub async fn get_agreement(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<agreements::Model>, ApiError> {
    Ok(Json(state.agreements.get(&principal, id).await?))
}

/// GET /api/agreements/number/{number}
pub async fn get_agreement_by_number(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(number): ApiPath<String>,
) -> Result<Json<agreements::Model>, ApiError> {
    Ok(Json(state.agreements.by_number(&principal, &number).await?))
}

/// POST /api/agreements
pub async fn create_agreement(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(request): ApiJson<CreateAgreementRequest>,
) -> Result<(StatusCode, Json<agreements::Model>), ApiError> {
    let created = state.agreements.create(&principal, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/agreements/{id}
pub async fn update_agreement(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<UpdateAgreementRequest>,
) -> Result<Json<agreements::Model>, ApiError> {
    Ok(Json(state.agreements.update(&principal, id, patch).await?))
}

/// DELETE /api/agreements/{id}
pub async fn delete_agreement(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    state.agreements.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/agreements/search
pub async fn search_agreements(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(filter): ApiQuery<AgreementFilter>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<AgreementPage, ApiError> {
    Ok(Json(state.agreements.search(&principal, filter, &page).await?))
}

/// GET /api/agreements/count
pub async fn count_agreements(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(filter): ApiQuery<AgreementFilter>,
) -> Result<Json<u64>, ApiError> {
    Ok(Json(state.agreements.count(&principal, filter).await?))
}

/// PATCH /api/agreements/{id}/status
pub async fn update_agreement_status(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<AgreementStatusRequest>,
) -> Result<Json<agreements::Model>, ApiError> {
    Ok(Json(state.agreements.update_status(&principal, id, request.status).await?))
}

/// POST /api/agreements/{id}/sign
pub async fn sign_agreement(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<SignRequest>,
) -> Result<Json<agreements::Model>, ApiError> {
    Ok(Json(state.agreements.sign(&principal, id, request).await?))
}

/// POST /api/agreements/{id}/terminate
pub async fn terminate_agreement(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<TerminateRequest>,
) -> Result<Json<agreements::Model>, ApiError> {
    Ok(Json(state.agreements.terminate(&principal, id, request).await?))
}

/// GET /api/agreements/active
pub async fn active_agreements(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<AgreementPage, ApiError> {
    Ok(Json(state.agreements.active(&principal, &page).await?))
}

/// GET /api/agreements/expiring?before=2026-12-31T00:00:00Z
pub async fn expiring_agreements(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<ExpiringAgreementsQuery>,
) -> Result<Json<Vec<agreements::Model>>, ApiError> {
    Ok(Json(state.agreements.expiring(&principal, query.before).await?))
}

/// GET /api/agreements/needing-renewal?days=30
pub async fn agreements_needing_renewal(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<ExpiringQuery>,
) -> Result<Json<Vec<agreements::Model>>, ApiError> {
    Ok(Json(state.agreements.needing_renewal(&principal, query.days).await?))
}

/// GET /api/agreements/pending-signatures
pub async fn pending_signature_agreements(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<AgreementPage, ApiError> {
    Ok(Json(state.agreements.pending_signatures(&principal, &page).await?))
}

/// GET /api/agreements/overdue-signatures
pub async fn overdue_signature_agreements(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<AgreementPage, ApiError> {
    Ok(Json(state.agreements.overdue_signatures(&principal, &page).await?))
}

