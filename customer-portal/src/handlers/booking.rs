//! Booking endpoints: slot availability and appointment creation.

use crate::AppState;
use crate::middleware::auth::CustomerContext;
use crate::models::Appointment;
use crate::services::{booking, scheduling};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{Local, NaiveDate, NaiveTime};
use portal_core::error::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Previously chosen time, re-validated when the date changes.
    #[serde(default)]
    pub selected: Option<NaiveTime>,
}

#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub date: NaiveDate,
    /// Default picker date: today, or tomorrow after closing time.
    pub initial_date: NaiveDate,
    pub slots: Vec<String>,
    /// The surviving or auto-reselected time, if any slot is open.
    pub selected: Option<String>,
}

pub async fn available_slots(
    _ctx: CustomerContext,
    Query(query): Query<SlotsQuery>,
) -> Json<SlotsResponse> {
    let now = Local::now().naive_local();
    let initial_date = scheduling::initial_date(now);
    let date = query.date.unwrap_or(initial_date);

    let slots = scheduling::available_slots(date, now)
        .iter()
        .map(|slot| slot.format("%H:%M").to_string())
        .collect();
    let selected =
        scheduling::reselect(date, query.selected, now).map(|t| t.format("%H:%M").to_string());

    Json(SlotsResponse {
        date,
        initial_date,
        slots,
        selected,
    })
}

pub async fn create_appointment(
    State(state): State<AppState>,
    ctx: CustomerContext,
    Json(request): Json<booking::BookingRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = booking::book(
        &state.garage_api,
        &ctx,
        request,
        Local::now().naive_local(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}
