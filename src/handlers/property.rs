//! Property Handlers
//!
//! Reads are public; writes require a landlord (or admin) token.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::auth::access::Principal;
use crate::error::ApiError;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::property::{
    CreatePropertyRequest, ExpiringQuery, PropertyAnalytics, PropertyResponse, PropertyStatusQuery,
    UpdatePropertyRequest,
};
use crate::entities::properties::PropertyStatus;
use crate::queries::geo::NearQuery;
use crate::queries::pagination::{Page, PageRequest};
use crate::queries::params::comma_separated;
use crate::queries::property::PropertyFilter;

/// GET /api/properties
pub async fn list_properties(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<Page<PropertyResponse>>, ApiError> {
    Ok(Json(state.properties.list(&page).await?))
}

/// GET /api/properties/{id}
pub async fn get_property(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<PropertyResponse>, ApiError> {
    Ok(Json(state.properties.get(id).await?))
}

/// POST /api/properties
pub async fn create_property(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(request): ApiJson<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<PropertyResponse>), ApiError> {
    info!(user_id = principal.user_id, title = %request.title, "Create property request");
    let created = state.properties.create(&principal, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/properties/{id}
///
/// Partial update: fields missing from the body are left unchanged, an
/// explicit `null` clears an optional field.
pub async fn update_property(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<UpdatePropertyRequest>,
) -> Result<Json<PropertyResponse>, ApiError> {
    Ok(Json(state.properties.update(&principal, id, patch).await?))
}

/// PATCH /api/properties/{id}/status?status=RENTED
pub async fn update_property_status(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<PropertyStatusQuery>,
) -> Result<Json<PropertyResponse>, ApiError> {
    Ok(Json(state.properties.update_status(&principal, id, query.status).await?))
}

/// DELETE /api/properties/{id}
pub async fn delete_property(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    state.properties.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/properties/search
pub async fn search_properties(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PropertyFilter>,
) -> Result<Json<Vec<PropertyResponse>>, ApiError> {
    Ok(Json(state.properties.search_all(&filter).await?))
}

/// GET /api/properties/search/paginated
pub async fn search_properties_paginated(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PropertyFilter>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<Page<PropertyResponse>>, ApiError> {
    Ok(Json(state.properties.search(&filter, &page).await?))
}

/// GET /api/properties/count
pub async fn count_properties(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PropertyFilter>,
) -> Result<Json<u64>, ApiError> {
    Ok(Json(state.properties.count(&filter).await?))
}

/// GET /api/properties/landlord/{id}
pub async fn properties_by_landlord(
    State(state): State<AppState>,
    ApiPath(landlord_id): ApiPath<i32>,
) -> Result<Json<Vec<PropertyResponse>>, ApiError> {
    Ok(Json(state.properties.by_landlord(landlord_id).await?))
}

/// GET /api/properties/landlord/{id}/paginated
pub async fn properties_by_landlord_paginated(
    State(state): State<AppState>,
    ApiPath(landlord_id): ApiPath<i32>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<Page<PropertyResponse>>, ApiError> {
    Ok(Json(state.properties.by_landlord_page(landlord_id, &page).await?))
}

/// GET /api/properties/landlord/{id}/count
pub async fn count_properties_by_landlord(
    State(state): State<AppState>,
    ApiPath(landlord_id): ApiPath<i32>,
) -> Result<Json<u64>, ApiError> {
    Ok(Json(state.properties.count_by_landlord(landlord_id).await?))
}

/// GET /api/properties/status/{status}
pub async fn properties_by_status(
    State(state): State<AppState>,
    ApiPath(status): ApiPath<PropertyStatus>,
) -> Result<Json<Vec<PropertyResponse>>, ApiError> {
    Ok(Json(state.properties.by_status(status).await?))
}

/// GET /api/properties/near-location?latitude=..&longitude=..&radius=..
pub async fn properties_near_location(
    State(state): State<AppState>,
    ApiQuery(near): ApiQuery<NearQuery>,
) -> Result<Json<Vec<PropertyResponse>>, ApiError> {
    Ok(Json(state.properties.near(&near).await?))
}

/// GET /api/properties/featured
pub async fn featured_properties(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<Page<PropertyResponse>>, ApiError> {
    Ok(Json(state.properties.featured(&page).await?))
}

/// GET /api/properties/expiring-soon?days=30
pub async fn properties_expiring_soon(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExpiringQuery>,
) -> Result<Json<Vec<PropertyResponse>>, ApiError> {
    Ok(Json(state.properties.expiring_soon(query.days).await?))
}

#[derive(Debug, Deserialize)]
pub struct AmenitiesQuery {
    #[serde(default, deserialize_with = "comma_separated")]
    pub amenities: Option<Vec<String>>,
}

/// GET /api/properties/amenities?amenities=pool,gym
pub async fn properties_by_amenities(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AmenitiesQuery>,
) -> Result<Json<Vec<PropertyResponse>>, ApiError> {
    let amenities = query.amenities.unwrap_or_default();
    Ok(Json(state.properties.by_amenities(amenities).await?))
}

/// GET /api/properties/analytics
pub async fn property_analytics(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<PropertyAnalytics>, ApiError> {
    Ok(Json(state.properties.analytics(&principal).await?))
}
