//! Auth Handlers
//!
//! Login and registration are public; `/me` needs a token.

use axum::{Json, extract::State, http::StatusCode};

use crate::AppState;
use crate::auth::access::Principal;
use crate::entities::users;
use crate::error::ApiError;
use crate::handlers::extract::ApiJson;
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest};

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(state.auth.login(request).await?))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<users::Model>), ApiError> {
    let user = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<users::Model>, ApiError> {
    Ok(Json(state.auth.me(&principal).await?))
}
