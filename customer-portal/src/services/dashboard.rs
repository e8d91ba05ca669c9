//! Customer dashboard summary.
//!
//! Unlike the per-item cost fallback, the summary has no partial-failure
//! isolation: the three upstream reads run concurrently and any failure
//! fails the whole summary with one error.

use crate::middleware::auth::CustomerContext;
use crate::models::{Appointment, Vehicle};
use crate::services::garage_api::{ApiError, GarageApiClient};
use crate::services::grouping::{self, MonthGroup};
use serde::Serialize;

pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_vehicles: usize,
    pub future_count: usize,
    pub past_count: usize,
    pub next_appointment: Option<Appointment>,
    pub recent_appointments: Vec<Appointment>,
}

pub async fn summarize(
    api: &GarageApiClient,
    ctx: &CustomerContext,
) -> Result<DashboardSummary, ApiError> {
    let (vehicles, for_future, for_past) = tokio::try_join!(
        api.list_vehicles(ctx),
        api.list_appointments(ctx),
        api.list_appointments(ctx),
    )?;

    let future = grouping::group_future(&for_future);
    let past = grouping::group_past(&for_past);

    Ok(build_summary(&vehicles, &future, &past))
}

/// Pure derivation over already-grouped data.
pub fn build_summary(
    vehicles: &[Vehicle],
    future: &[MonthGroup],
    past: &[MonthGroup],
) -> DashboardSummary {
    // Future groups are ascending inside and out, so the very first entry
    // is the next appointment; past groups are descending, so a plain take
    // yields the most recent visits.
    let next_appointment = future
        .first()
        .and_then(|group| group.appointments.first())
        .cloned();

    let recent_appointments = past
        .iter()
        .flat_map(|group| group.appointments.iter())
        .take(RECENT_LIMIT)
        .cloned()
        .collect();

    DashboardSummary {
        total_vehicles: vehicles.iter().filter(|v| v.is_active()).count(),
        future_count: grouping::total_count(future),
        past_count: grouping::total_count(past),
        next_appointment,
        recent_appointments,
    }
}
