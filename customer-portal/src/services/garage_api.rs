//! Garage API client.
//!
//! Every portal view is derived from this upstream REST API; the API exposes
//! no server-side status or date filters, so listing endpoints return the
//! full collection and filtering happens here in the portal. The client owns
//! one pooled `reqwest::Client` with a request timeout, and the customer's
//! bearer token arrives per request via [`CustomerContext`].

use crate::config::GarageApiSettings;
use crate::middleware::auth::CustomerContext;
use crate::models::{
    Appointment, CostBreakdown, Invoice, NewAppointment, ServiceOffering, Vehicle,
};
use async_trait::async_trait;
use portal_core::error::AppError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to garage API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("garage API returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("resource not generated yet")]
    NotReady,

    #[error("failed to decode garage API response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Transient failures are retried by the reconciliation poller and
    /// absorbed by the cost fallback.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) | ApiError::NotReady => true,
            ApiError::Upstream { status, .. } => status.is_server_error(),
            ApiError::Decode(_) => false,
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Upstream { status, body } if status == StatusCode::UNAUTHORIZED => {
                AppError::Unauthorized(anyhow::anyhow!("garage API rejected credentials: {body}"))
            }
            ApiError::Upstream { status, body } if status == StatusCode::NOT_FOUND => {
                AppError::NotFound(anyhow::anyhow!("garage API: {body}"))
            }
            ApiError::Upstream { status, body } if status.is_client_error() => {
                AppError::BadRequest(anyhow::anyhow!("garage API returned {status}: {body}"))
            }
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

/// Checkout session created by the external payment provider.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Provider-hosted URL the customer is redirected to.
    pub url: String,
}

#[derive(Debug, Serialize)]
struct CheckoutSessionRequest {
    appointment_id: i64,
}

#[derive(Clone)]
pub struct GarageApiClient {
    client: Client,
    settings: GarageApiSettings,
}

impl GarageApiClient {
    pub fn new(settings: GarageApiSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build garage API client: {e}"))?;

        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream { status, body });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &CustomerContext,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&ctx.access_token)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Full appointment list for the signed-in customer; all filtering and
    /// grouping happens client-side.
    pub async fn list_appointments(&self, ctx: &CustomerContext) -> Result<Vec<Appointment>, ApiError> {
        self.get_json(ctx, "/appointments").await
    }

    pub async fn create_appointment(
        &self,
        ctx: &CustomerContext,
        payload: &NewAppointment,
    ) -> Result<Appointment, ApiError> {
        let response = self
            .client
            .post(self.url("/appointments"))
            .bearer_auth(&ctx.access_token)
            .json(payload)
            .send()
            .await?;

        Self::decode(response).await
    }

    pub async fn cancel_appointment(
        &self,
        ctx: &CustomerContext,
        appointment_id: i64,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/appointments/{}/cancel", appointment_id)))
            .bearer_auth(&ctx.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream { status, body });
        }

        Ok(())
    }

    pub async fn list_vehicles(&self, ctx: &CustomerContext) -> Result<Vec<Vehicle>, ApiError> {
        self.get_json(ctx, "/vehicles").await
    }

    pub async fn list_services(
        &self,
        ctx: &CustomerContext,
    ) -> Result<Vec<ServiceOffering>, ApiError> {
        self.get_json(ctx, "/services").await
    }

    /// Create a provider-hosted checkout session for an appointment. The
    /// caller performs a full navigation redirect to the returned URL.
    pub async fn create_checkout_session(
        &self,
        ctx: &CustomerContext,
        appointment_id: i64,
    ) -> Result<CheckoutSession, ApiError> {
        let response = self
            .client
            .post(self.url("/payments/create-checkout-session"))
            .bearer_auth(&ctx.access_token)
            .json(&CheckoutSessionRequest { appointment_id })
            .send()
            .await?;

        Self::decode(response).await
    }
}

/// Cost-breakdown provider seam, mockable in tests.
#[async_trait]
pub trait BreakdownProvider: Send + Sync {
    async fn cost_breakdown(
        &self,
        ctx: &CustomerContext,
        appointment_id: i64,
    ) -> Result<CostBreakdown, ApiError>;
}

#[async_trait]
impl BreakdownProvider for GarageApiClient {
    async fn cost_breakdown(
        &self,
        ctx: &CustomerContext,
        appointment_id: i64,
    ) -> Result<CostBreakdown, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/appointments/{}/cost-breakdown", appointment_id)))
            .bearer_auth(&ctx.access_token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotReady);
        }

        Self::decode(response).await
    }
}

/// Invoice provider seam, mockable in tests.
#[async_trait]
pub trait InvoiceProvider: Send + Sync {
    async fn invoice_for_appointment(
        &self,
        ctx: &CustomerContext,
        appointment_id: i64,
    ) -> Result<Invoice, ApiError>;
}

#[async_trait]
impl InvoiceProvider for GarageApiClient {
    async fn invoice_for_appointment(
        &self,
        ctx: &CustomerContext,
        appointment_id: i64,
    ) -> Result<Invoice, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/payments/invoices/{}", appointment_id)))
            .bearer_auth(&ctx.access_token)
            .send()
            .await?;

        // The invoice record is written asynchronously after capture; a 404
        // here usually means "not yet".
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotReady);
        }

        Self::decode(response).await
    }
}
