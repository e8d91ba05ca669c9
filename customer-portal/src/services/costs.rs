//! Appointment cost totals.
//!
//! Display totals come from the per-appointment cost breakdown; when the
//! breakdown cannot be fetched the stored budgets stand in, so one bad
//! record never blanks the rest of the list.

use crate::middleware::auth::CustomerContext;
use crate::models::Appointment;
use crate::services::garage_api::BreakdownProvider;
use crate::services::metrics;
use futures::future::join_all;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct CostAggregator<P> {
    provider: Arc<P>,
}

impl<P: BreakdownProvider> CostAggregator<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Displayable total for one appointment: the provider's breakdown
    /// total, or the stored-budget fallback when the fetch fails.
    pub async fn total_for(&self, ctx: &CustomerContext, appointment: &Appointment) -> Decimal {
        match self.provider.cost_breakdown(ctx, appointment.id).await {
            Ok(breakdown) => breakdown.total,
            Err(error) => {
                tracing::warn!(
                    appointment_id = appointment.id,
                    error = %error,
                    "cost breakdown unavailable, using stored budget"
                );
                metrics::observe_cost_fallback();
                fallback_total(appointment)
            }
        }
    }

    /// Totals for a collection, keyed by appointment id. Fetches run
    /// concurrently and each is isolated: a failing appointment falls back
    /// on its own without aborting the others.
    pub async fn totals_for(
        &self,
        ctx: &CustomerContext,
        appointments: &[Appointment],
    ) -> HashMap<i64, Decimal> {
        let totals = join_all(
            appointments
                .iter()
                .map(|appointment| self.total_for(ctx, appointment)),
        )
        .await;

        appointments
            .iter()
            .map(|a| a.id)
            .zip(totals)
            .collect()
    }
}

/// Stored-budget fallback: the actual budget when present and non-zero,
/// else the estimate, else zero.
pub fn fallback_total(appointment: &Appointment) -> Decimal {
    match appointment.actual_budget {
        Some(actual) if !actual.is_zero() => actual,
        _ => appointment.estimated_budget.unwrap_or_default(),
    }
}
