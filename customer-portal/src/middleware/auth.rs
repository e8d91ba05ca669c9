//! Session-based customer authentication.
//!
//! Credentials are validated by the external auth service; the portal only
//! stores the resulting identity in the session. Identity then travels as an
//! explicit [`CustomerContext`] value into every upstream call, never as
//! process-wide state.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use portal_core::error::AppError;
use tower_sessions::Session;

pub const CUSTOMER_ID_KEY: &str = "customer_id";
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Identity of the signed-in customer.
#[derive(Debug, Clone)]
pub struct CustomerContext {
    pub customer_id: i64,
    pub access_token: String,
}

impl CustomerContext {
    pub fn new(customer_id: i64, access_token: String) -> Self {
        Self {
            customer_id,
            access_token,
        }
    }
}

/// Redirect anonymous requests to the login page, carrying the original
/// path so the intent survives authentication.
pub async fn auth_middleware(session: Session, request: Request<Body>, next: Next) -> Response {
    let customer_id: Option<i64> = session.get(CUSTOMER_ID_KEY).await.unwrap_or(None);

    if customer_id.is_none() {
        let original = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        let target = format!("/login?next={}", urlencoding::encode(&original));
        return Redirect::to(&target).into_response();
    }

    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for CustomerContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| {
                AppError::InternalError(anyhow::anyhow!("session layer missing: {msg}"))
            })?;

        let customer_id: i64 = session
            .get(CUSTOMER_ID_KEY)
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("session read failed: {e}")))?
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("not signed in")))?;

        let access_token: String = session
            .get(ACCESS_TOKEN_KEY)
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("session read failed: {e}")))?
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("session has no token")))?;

        // Add to tracing span for observability
        tracing::Span::current().record("customer_id", customer_id);

        Ok(CustomerContext::new(customer_id, access_token))
    }
}
