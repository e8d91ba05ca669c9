//! Grouped appointment views and cancellation.

use crate::AppState;
use crate::middleware::auth::CustomerContext;
use crate::models::Appointment;
use crate::services::{booking, grouping};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use portal_core::error::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    #[default]
    Future,
    Past,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub view: ViewKind,
}

/// An appointment plus the display total the cost aggregator resolved.
#[derive(Debug, Serialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub display_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct MonthGroupView {
    pub label: String,
    pub appointments: Vec<AppointmentView>,
}

#[derive(Debug, Serialize)]
pub struct GroupedAppointmentsResponse {
    pub view: ViewKind,
    pub groups: Vec<MonthGroupView>,
}

pub async fn list_appointments(
    State(state): State<AppState>,
    ctx: CustomerContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<GroupedAppointmentsResponse>, AppError> {
    let appointments = state.garage_api.list_appointments(&ctx).await?;

    let groups = match query.view {
        ViewKind::Future => grouping::group_future(&appointments),
        ViewKind::Past => grouping::group_past(&appointments),
    };

    let visible: Vec<Appointment> = groups
        .iter()
        .flat_map(|g| g.appointments.iter().cloned())
        .collect();
    let totals = state.costs.totals_for(&ctx, &visible).await;

    let groups = groups
        .into_iter()
        .map(|group| MonthGroupView {
            label: group.label,
            appointments: group
                .appointments
                .into_iter()
                .map(|appointment| AppointmentView {
                    display_total: totals.get(&appointment.id).copied().unwrap_or_default(),
                    appointment,
                })
                .collect(),
        })
        .collect();

    Ok(Json(GroupedAppointmentsResponse {
        view: query.view,
        groups,
    }))
}

pub async fn cancel_appointment(
    State(state): State<AppState>,
    ctx: CustomerContext,
    Path(appointment_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    booking::cancel(&state.garage_api, &ctx, appointment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
