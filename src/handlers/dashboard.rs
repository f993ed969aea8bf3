use axum::{Json, extract::State};

use crate::AppState;
use crate::auth::access::Principal;
use crate::error::ApiError;
use crate::models::dashboard::DashboardSummary;

/// GET /api/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(state.dashboard.summary(&principal).await?))
}
