//! User Handlers

use axum::{Json, extract::State, http::StatusCode};

use crate::AppState;
use crate::auth::access::Principal;
use crate::entities::users;
use crate::error::ApiError;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::user::UpdateUserRequest;
use crate::queries::pagination::{Page, PageRequest};

/// GET /api/users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<Page<users::Model>>, ApiError> {
    Ok(Json(state.users.list(&principal, &page).await?))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<users::Model>, ApiError> {
    Ok(Json(state.users.get(&principal, id).await?))
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<UpdateUserRequest>,
) -> Result<Json<users::Model>, ApiError> {
    Ok(Json(state.users.update(&principal, id, patch).await?))
}

/// DELETE /api/users/{id} (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    state.users.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
