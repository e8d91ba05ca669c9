use crate::AppState;
use crate::middleware::auth::CustomerContext;
use crate::services::dashboard::{self, DashboardSummary};
use axum::{Json, extract::State};
use portal_core::error::AppError;

pub async fn dashboard_summary(
    State(state): State<AppState>,
    ctx: CustomerContext,
) -> Result<Json<DashboardSummary>, AppError> {
    let summary = dashboard::summarize(&state.garage_api, &ctx).await?;
    Ok(Json(summary))
}
