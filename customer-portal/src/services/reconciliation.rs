//! Post-checkout payment reconciliation.
//!
//! The payment provider redirects the customer back with
//! `payment=success&appointment=<id>` or `payment=cancelled`. The invoice
//! record is written asynchronously by the billing pipeline, so on the
//! success leg the poller re-fetches it under a bounded backoff. Exhausting
//! the budget still acknowledges the payment; the invoice number just
//! arrives later.

use crate::middleware::auth::CustomerContext;
use crate::services::garage_api::{ApiError, InvoiceProvider};
use crate::services::metrics;
use portal_core::retry::{RetryOutcome, RetryPolicy, retry_with_policy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const MAX_ATTEMPTS: u32 = 5;
const INITIAL_DELAY: Duration = Duration::from_millis(1000);
const BACKOFF_MULTIPLIER: f64 = 1.5;

/// Query parameters on the page the checkout redirects back to.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnQuery {
    #[serde(default)]
    pub payment: Option<String>,
    #[serde(default)]
    pub appointment: Option<i64>,
}

/// Parsed return-URL state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentReturn {
    Success { appointment_id: i64 },
    Cancelled,
}

impl PaymentReturn {
    /// Anything other than the two checkout outcomes means the page was
    /// reached without a checkout round-trip.
    pub fn from_query(query: &ReturnQuery) -> Option<Self> {
        match query.payment.as_deref() {
            Some("success") => query
                .appointment
                .map(|appointment_id| PaymentReturn::Success { appointment_id }),
            // The provider sends the British spelling; accept both.
            Some("cancelled") | Some("canceled") => Some(PaymentReturn::Cancelled),
            _ => None,
        }
    }
}

/// Outcome surfaced to the portal after the return page resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconciliationOutcome {
    /// Payment captured. `invoice_number` is absent while the invoice
    /// record is still being generated.
    Confirmed { invoice_number: Option<String> },
    /// The customer backed out of checkout.
    Cancelled,
    /// The consuming view went away mid-poll; nothing was recorded.
    Aborted,
}

#[derive(Clone)]
pub struct PaymentReconciler<P> {
    provider: Arc<P>,
    policy: RetryPolicy,
}

impl<P: InvoiceProvider> PaymentReconciler<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self::with_policy(
            provider,
            RetryPolicy::new(MAX_ATTEMPTS, INITIAL_DELAY, BACKOFF_MULTIPLIER),
        )
    }

    pub fn with_policy(provider: Arc<P>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Resolve a checkout return. The cancelled leg resolves immediately;
    /// the success leg polls for the invoice.
    pub async fn resolve(
        &self,
        ctx: &CustomerContext,
        trigger: PaymentReturn,
        cancel: &CancellationToken,
    ) -> ReconciliationOutcome {
        match trigger {
            PaymentReturn::Cancelled => {
                metrics::observe_reconciliation("cancelled");
                ReconciliationOutcome::Cancelled
            }
            PaymentReturn::Success { appointment_id } => {
                self.confirm(ctx, appointment_id, cancel).await
            }
        }
    }

    async fn confirm(
        &self,
        ctx: &CustomerContext,
        appointment_id: i64,
        cancel: &CancellationToken,
    ) -> ReconciliationOutcome {
        let outcome = retry_with_policy(
            &self.policy,
            "fetch_invoice",
            cancel,
            ApiError::is_transient,
            || self.provider.invoice_for_appointment(ctx, appointment_id),
        )
        .await;

        match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                tracing::info!(
                    appointment_id,
                    attempts,
                    invoice_number = %value.invoice_number,
                    "payment reconciled"
                );
                metrics::observe_reconciliation("confirmed");
                ReconciliationOutcome::Confirmed {
                    invoice_number: Some(value.invoice_number),
                }
            }
            RetryOutcome::Exhausted {
                last_error,
                attempts,
            } => {
                // Payment success must always be acknowledged; the invoice
                // record simply has not materialized yet.
                tracing::warn!(
                    appointment_id,
                    attempts,
                    error = %last_error,
                    "invoice not available yet, payment acknowledged without invoice number"
                );
                metrics::observe_reconciliation("confirmed_pending_invoice");
                ReconciliationOutcome::Confirmed {
                    invoice_number: None,
                }
            }
            RetryOutcome::Cancelled => {
                tracing::debug!(appointment_id, "reconciliation aborted by caller");
                ReconciliationOutcome::Aborted
            }
        }
    }
}
