//! Listing Handlers

use axum::{Json, extract::State, http::StatusCode};

use crate::AppState;
use crate::auth::access::Principal;
use crate::entities::listings;
use crate::error::ApiError;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::listing::{
    CreateListingRequest, FeaturedRequest, ListingAnalytics, ListingAnalyticsQuery, ListingStatusRequest,
    UpdateListingRequest,
};
use crate::models::property::ExpiringQuery;
use crate::queries::geo::NearQuery;
use crate::queries::listing::ListingFilter;
use crate::queries::pagination::{Page, PageRequest};

type ListingPage = Json<Page<listings::Model>>;

/// GET /api/listings
pub async fn list_listings(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ListingPage, ApiError> {
    Ok(Json(state.listings.list(&page).await?))
}

/// GET /api/listings/{id}
pub async fn get_listing(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<listings::Model>, ApiError> {
    Ok(Json(state.listings.get(id).await?))
}

/// POST /api/listings
pub async fn create_listing(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(request): ApiJson<CreateListingRequest>,
) -> Result<(StatusCode, Json<listings::Model>), ApiError> {
    let created = state.listings.create(&principal, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/listings/{id}
pub async fn update_listing(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<UpdateListingRequest>,
) -> Result<Json<listings::Model>, ApiError> {
    Ok(Json(state.listings.update(&principal, id, patch).await?))
}

/// PATCH /api/listings/{id}/status
pub async fn update_listing_status(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<ListingStatusRequest>,
) -> Result<Json<listings::Model>, ApiError> {
    Ok(Json(state.listings.update_status(&principal, id, request.status).await?))
}

/// DELETE /api/listings/{id}
pub async fn delete_listing(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    state.listings.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/listings/{id}/view
pub async fn record_listing_view(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<listings::Model>, ApiError> {
    Ok(Json(state.listings.record_view(id).await?))
}

/// PATCH /api/listings/{id}/featured
pub async fn set_listing_featured(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<FeaturedRequest>,
) -> Result<Json<listings::Model>, ApiError> {
    Ok(Json(state.listings.set_featured(&principal, id, request).await?))
}

/// GET /api/listings/search
pub async fn search_listings(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ListingFilter>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ListingPage, ApiError> {
    Ok(Json(state.listings.search(&filter.active_by_default(), &page).await?))
}

/// GET /api/listings/count
pub async fn count_listings(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ListingFilter>,
) -> Result<Json<u64>, ApiError> {
    Ok(Json(state.listings.count(&filter).await?))
}

/// GET /api/listings/active
pub async fn active_listings(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ListingPage, ApiError> {
    Ok(Json(state.listings.active(&page).await?))
}

/// GET /api/listings/featured
pub async fn featured_listings(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ListingPage, ApiError> {
    Ok(Json(state.listings.featured(&page).await?))
}

/// GET /api/listings/popular
pub async fn popular_listings(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ListingPage, ApiError> {
    Ok(Json(state.listings.popular(&page).await?))
}

/// GET /api/listings/expiring?days=7
pub async fn expiring_listings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExpiringQuery>,
) -> Result<Json<Vec<listings::Model>>, ApiError> {
    Ok(Json(state.listings.expiring(query.days).await?))
}

/// GET /api/listings/near-location
pub async fn listings_near_location(
    State(state): State<AppState>,
    ApiQuery(near): ApiQuery<NearQuery>,
) -> Result<Json<Vec<listings::Model>>, ApiError> {
    Ok(Json(state.listings.near(&near).await?))
}

/// GET /api/listings/landlord/{id}
pub async fn listings_by_landlord(
    State(state): State<AppState>,
    ApiPath(landlord_id): ApiPath<i32>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ListingPage, ApiError> {
    Ok(Json(state.listings.by_landlord(landlord_id, &page).await?))
}

/// GET /api/listings/property/{id}
pub async fn listings_by_property(
    State(state): State<AppState>,
    ApiPath(property_id): ApiPath<i32>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<ListingPage, ApiError> {
    Ok(Json(state.listings.by_property(property_id, &page).await?))
}

/// GET /api/listings/analytics?city=Austin
pub async fn listing_analytics(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<ListingAnalyticsQuery>,
) -> Result<Json<ListingAnalytics>, ApiError> {
    Ok(Json(state.listings.analytics(&principal, query.city.as_deref()).await?))
}
