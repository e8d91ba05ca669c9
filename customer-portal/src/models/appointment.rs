use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::{AppointmentStatus, StatusBucket, StatusRef, cancellable_label};

/// A booked service visit as returned by `GET /appointments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub appointment_date: NaiveDateTime,
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub service_id: i64,
    pub status: StatusRef,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub estimated_budget: Option<Decimal>,
    #[serde(default)]
    pub actual_budget: Option<Decimal>,
    #[serde(default)]
    pub service: Option<ServiceSummary>,
    #[serde(default)]
    pub vehicle: Option<VehicleSummary>,
    #[serde(default)]
    pub extra_services: Vec<ExtraService>,
}

impl Appointment {
    pub fn status(&self) -> Option<AppointmentStatus> {
        AppointmentStatus::resolve(&self.status)
    }

    /// Unrecognized statuses land in neither grouped view.
    pub fn bucket(&self) -> StatusBucket {
        self.status()
            .map(|s| s.bucket())
            .unwrap_or(StatusBucket::Other)
    }

    pub fn is_cancellable(&self) -> bool {
        match self.status() {
            Some(status) => status.is_cancellable(),
            None => cancellable_label(&self.status.name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub id: i64,
    pub plate: String,
    pub brand: String,
    pub model: String,
}

/// An add-on line the workshop attached to an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraService {
    pub description: String,
    pub cost: Decimal,
}

/// Payload for creating an appointment upstream.
#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub service_id: i64,
    pub appointment_date: NaiveDateTime,
    pub description: String,
    pub estimated_budget: Decimal,
}

/// A bookable service with its advertised price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
}
