//! Booking flow: local validation and slot re-checks before the upstream
//! create, and the eligibility-guarded cancel.

use crate::middleware::auth::CustomerContext;
use crate::models::{Appointment, NewAppointment};
use crate::services::garage_api::GarageApiClient;
use crate::services::{metrics, scheduling};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use portal_core::error::AppError;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct BookingRequest {
    #[validate(range(min = 1, message = "a service must be selected"))]
    pub service_id: i64,
    #[validate(range(min = 1, message = "a vehicle must be selected"))]
    pub vehicle_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[validate(length(min = 10, message = "description must be at least 10 characters"))]
    pub description: String,
}

/// Validate and submit a booking. The chosen service's advertised price
/// seeds the new appointment's estimated budget; the appointment starts as
/// pending upstream.
pub async fn book(
    api: &GarageApiClient,
    ctx: &CustomerContext,
    request: BookingRequest,
    now: NaiveDateTime,
) -> Result<Appointment, AppError> {
    request.validate()?;

    if request.date < scheduling::initial_date(now) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "appointment date is in the past"
        )));
    }
    if !scheduling::slot_times().contains(&request.time) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "time is not a bookable slot"
        )));
    }
    if !scheduling::is_available(request.date, request.time, now) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "selected time is no longer available"
        )));
    }

    let services = api.list_services(ctx).await.map_err(AppError::from)?;
    let offering = services
        .into_iter()
        .find(|s| s.id == request.service_id)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("unknown service")))?;

    let payload = NewAppointment {
        customer_id: ctx.customer_id,
        vehicle_id: request.vehicle_id,
        service_id: request.service_id,
        appointment_date: request.date.and_time(request.time),
        description: request.description,
        estimated_budget: offering.price,
    };

    let appointment = api
        .create_appointment(ctx, &payload)
        .await
        .map_err(AppError::from)?;

    tracing::info!(
        appointment_id = appointment.id,
        service_id = payload.service_id,
        vehicle_id = payload.vehicle_id,
        "appointment booked"
    );
    metrics::observe_booking();

    Ok(appointment)
}

/// Cancel an appointment after checking eligibility locally, so terminal or
/// in-repair bookings are refused without an upstream round-trip.
pub async fn cancel(
    api: &GarageApiClient,
    ctx: &CustomerContext,
    appointment_id: i64,
) -> Result<(), AppError> {
    let appointments = api.list_appointments(ctx).await.map_err(AppError::from)?;
    let appointment = appointments
        .iter()
        .find(|a| a.id == appointment_id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("appointment not found")))?;

    if !appointment.is_cancellable() {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "appointment in status '{}' can no longer be cancelled",
            appointment.status.name
        )));
    }

    api.cancel_appointment(ctx, appointment_id)
        .await
        .map_err(AppError::from)?;

    tracing::info!(appointment_id, "appointment cancelled");
    Ok(())
}
