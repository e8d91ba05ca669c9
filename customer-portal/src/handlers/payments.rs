//! Checkout initiation and the post-checkout return leg.

use crate::AppState;
use crate::middleware::auth::CustomerContext;
use crate::models::AppointmentStatus;
use crate::services::reconciliation::{PaymentReturn, ReconciliationOutcome, ReturnQuery};
use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use portal_core::error::AppError;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_sessions::Session;

pub const PAYMENT_OUTCOME_KEY: &str = "payment_outcome";

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub appointment_id: i64,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Provider-hosted checkout URL; the caller performs a full navigation
    /// redirect to it.
    pub url: String,
}

pub async fn create_checkout(
    State(state): State<AppState>,
    ctx: CustomerContext,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let appointments = state.garage_api.list_appointments(&ctx).await?;
    let appointment = appointments
        .iter()
        .find(|a| a.id == payload.appointment_id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("appointment not found")))?;

    if appointment.status() != Some(AppointmentStatus::WaitingPayment) {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "appointment in status '{}' is not payable",
            appointment.status.name
        )));
    }

    let session = state
        .garage_api
        .create_checkout_session(&ctx, payload.appointment_id)
        .await?;

    tracing::info!(
        appointment_id = payload.appointment_id,
        "checkout session created"
    );

    Ok(Json(CheckoutResponse { url: session.url }))
}

/// Landing point for the external checkout redirect.
///
/// Resolves the reconciliation, parks the outcome in the session flash
/// slot, and answers with a see-other redirect to a clean URL so refresh
/// or back never replays the checkout parameters.
pub async fn payment_return(
    State(state): State<AppState>,
    ctx: CustomerContext,
    session: Session,
    Query(query): Query<ReturnQuery>,
) -> Result<Redirect, AppError> {
    let Some(trigger) = PaymentReturn::from_query(&query) else {
        return Ok(Redirect::to("/"));
    };

    let cancel = CancellationToken::new();
    let outcome = state.reconciler.resolve(&ctx, trigger, &cancel).await;

    if outcome != ReconciliationOutcome::Aborted {
        session
            .insert(PAYMENT_OUTCOME_KEY, &outcome)
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("session write failed: {e}")))?;
    }

    Ok(Redirect::to("/"))
}

/// Read-and-clear the stashed reconciliation outcome.
pub async fn payment_outcome(
    _ctx: CustomerContext,
    session: Session,
) -> Result<Json<Option<ReconciliationOutcome>>, AppError> {
    let outcome: Option<ReconciliationOutcome> = session
        .remove(PAYMENT_OUTCOME_KEY)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("session read failed: {e}")))?;

    Ok(Json(outcome))
}
