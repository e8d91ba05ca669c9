//! Wire models for the garage API.

mod appointment;
mod cost;
mod invoice;
mod status;
mod vehicle;

pub use appointment::{
    Appointment, ExtraService, NewAppointment, ServiceOffering, ServiceSummary, VehicleSummary,
};
pub use cost::{CostBreakdown, PartLine, ServiceBreakdown};
pub use invoice::{Invoice, InvoiceLineItem};
pub use status::{AppointmentStatus, StatusBucket, StatusRef, cancellable_label};
pub use vehicle::Vehicle;
