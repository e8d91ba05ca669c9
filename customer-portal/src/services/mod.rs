pub mod auth_client;
pub mod booking;
pub mod costs;
pub mod dashboard;
pub mod garage_api;
pub mod grouping;
pub mod metrics;
pub mod reconciliation;
pub mod scheduling;
