//! Application Handlers
//!
//! All routes need a token; what the caller sees depends on their role.

use axum::{Json, extract::State, http::StatusCode};

use crate::AppState;
use crate::auth::access::Principal;
use crate::entities::applications::{self, ApplicationStatus};
use crate::error::ApiError;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::application::{
    ApplicationAnalytics, ApplicationStatusRequest, ApplicationValidation, CreateApplicationRequest,
    CreditScoreRangeQuery, IncomeRangeQuery, ReviewRequest, UpdateApplicationRequest,
};
use crate::queries::application::ApplicationFilter;
use crate::queries::pagination::{Page, PageRequest};

type ApplicationPage = Json<Page<applications::Model>>;

/// GET /api/applications
pub async fn list_applications(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ApplicationPage, ApiError> {
    Ok(Json(state.applications.list(&principal, &page).await?))
}

/// GET /api/applications/{id}
pub async fn get_application(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<applications::Model>, ApiError> {
    Ok(Json(state.applications.get(&principal, id).await?))
}

/// POST /api/applications
pub async fn create_application(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(request): ApiJson<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<applications::Model>), ApiError> {
    let created = state.applications.create(&principal, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/applications/{id}
pub async fn update_application(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<UpdateApplicationRequest>,
) -> Result<Json<applications::Model>, ApiError> {
    Ok(Json(state.applications.update(&principal, id, patch).await?))
}

/// DELETE /api/applications/{id}
pub async fn delete_application(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    state.applications.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/applications/search
pub async fn search_applications(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(filter): ApiQuery<ApplicationFilter>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ApplicationPage, ApiError> {
    Ok(Json(state.applications.search(&principal, filter, &page).await?))
}

/// GET /api/applications/pending
pub async fn pending_applications(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ApplicationPage, ApiError> {
    Ok(Json(state.applications.pending(&principal, &page).await?))
}

/// GET /api/applications/needing-review
pub async fn applications_needing_review(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ApplicationPage, ApiError> {
    Ok(Json(state.applications.needing_review(&principal, &page).await?))
}

/// GET /api/applications/overdue
pub async fn overdue_applications(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ApplicationPage, ApiError> {
    Ok(Json(state.applications.overdue(&principal, &page).await?))
}

/// GET /api/applications/tenant/{id}
pub async fn applications_by_tenant(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(tenant_id): ApiPath<i32>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ApplicationPage, ApiError> {
    Ok(Json(state.applications.by_tenant(&principal, tenant_id, &page).await?))
}

/// GET /api/applications/landlord/{id}
pub async fn applications_by_landlord(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(landlord_id): ApiPath<i32>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ApplicationPage, ApiError> {
    Ok(Json(state.applications.by_landlord(&principal, landlord_id, &page).await?))
}

/// GET /api/applications/landlord/{id}/pending
pub async fn pending_applications_by_landlord(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(landlord_id): ApiPath<i32>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ApplicationPage, ApiError> {
    Ok(Json(
        state
            .applications
            .pending_by_landlord(&principal, landlord_id, &page)
            .await?,
    ))
}

/// GET /api/applications/landlord/{id}/pending/count
pub async fn count_pending_applications_by_landlord(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(landlord_id): ApiPath<i32>,
) -> Result<Json<u64>, ApiError> {
    Ok(Json(
        state
            .applications
            .count_pending_by_landlord(&principal, landlord_id)
            .await?,
    ))
}

/// GET /api/applications/property/{id}
pub async fn applications_by_property(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(property_id): ApiPath<i32>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ApplicationPage, ApiError> {
    Ok(Json(state.applications.by_property(&principal, property_id, &page).await?))
}

/// GET /api/applications/listing/{id}
pub async fn applications_by_listing(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(listing_id): ApiPath<i32>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ApplicationPage, ApiError> {
    Ok(Json(state.applications.by_listing(&principal, listing_id, &page).await?))
}

/// GET /api/applications/status/{status}
pub async fn applications_by_status(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(status): ApiPath<ApplicationStatus>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ApplicationPage, ApiError> {
    Ok(Json(state.applications.by_status(&principal, status, &page).await?))
}

/// GET /api/applications/credit-score-range?minScore=650&maxScore=750
pub async fn applications_by_credit_score(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(range): ApiQuery<CreditScoreRangeQuery>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ApplicationPage, ApiError> {
    Ok(Json(
        state
            .applications
            .by_credit_score(&principal, range.min_score, range.max_score, &page)
            .await?,
    ))
}

/// GET /api/applications/income-range?minIncome=3000&maxIncome=6000
pub async fn applications_by_income(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(range): ApiQuery<IncomeRangeQuery>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ApplicationPage, ApiError> {
    Ok(Json(
        state
            .applications
            .by_income(&principal, range.min_income, range.max_income, &page)
            .await?,
    ))
}

/// PATCH /api/applications/{id}/status
pub async fn update_application_status(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<ApplicationStatusRequest>,
) -> Result<Json<applications::Model>, ApiError> {
    Ok(Json(state.applications.update_status(&principal, id, request.status).await?))
}

/// PATCH /api/applications/{id}/review
pub async fn review_application(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<ReviewRequest>,
) -> Result<Json<applications::Model>, ApiError> {
    Ok(Json(state.applications.review(&principal, id, request).await?))
}

/// PATCH /api/applications/{id}/fee-paid
pub async fn mark_application_fee_paid(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<applications::Model>, ApiError> {
    Ok(Json(state.applications.mark_fee_paid(&principal, id).await?))
}

/// GET /api/applications/{id}/validate
pub async fn validate_application(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApplicationValidation>, ApiError> {
    Ok(Json(state.applications.validate(&principal, id).await?))
}

/// GET /api/applications/analytics
pub async fn application_analytics(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<ApplicationAnalytics>, ApiError> {
    Ok(Json(state.applications.analytics(&principal).await?))
}

/// GET /api/applications/count
pub async fn count_applications(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(filter): ApiQuery<ApplicationFilter>,
) -> Result<Json<u64>, ApiError> {
    Ok(Json(state.applications.count(&principal, filter).await?))
}
