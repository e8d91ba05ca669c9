//! Login/logout, proxied to the external auth service.

use crate::AppState;
use crate::middleware::auth::{ACCESS_TOKEN_KEY, CUSTOMER_ID_KEY};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use portal_core::error::AppError;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub customer_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    #[serde(default)]
    pub next: Option<String>,
}

/// The JSON stand-in for a login page: tells an anonymous caller where to
/// send credentials and echoes the preserved return path.
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "authentication required",
            "login": "POST /login",
            "next": query.next,
        })),
    )
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;

    let tokens = state
        .auth_client
        .login(&payload.email, &payload.password)
        .await?;

    session
        .insert(CUSTOMER_ID_KEY, tokens.customer_id)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("session write failed: {e}")))?;
    session
        .insert(ACCESS_TOKEN_KEY, &tokens.access_token)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("session write failed: {e}")))?;

    tracing::info!(customer_id = tokens.customer_id, "customer signed in");

    Ok(Json(LoginResponse {
        customer_id: tokens.customer_id,
    }))
}

pub async fn logout_handler(session: Session) -> Result<StatusCode, AppError> {
    session
        .flush()
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("session flush failed: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}
