use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// Metrics
pub static COST_FALLBACKS_TOTAL: OnceLock<IntCounter> = OnceLock::new();
pub static RECONCILIATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static BOOKINGS_TOTAL: OnceLock<IntCounter> = OnceLock::new();

pub fn init_metrics() {
    let registry = Registry::new();

    let cost_fallbacks = IntCounter::with_opts(Opts::new(
        "portal_cost_fallbacks_total",
        "Appointments whose display total fell back to a stored budget",
    ))
    .expect("metric can be created");

    let reconciliations = IntCounterVec::new(
        Opts::new(
            "portal_payment_reconciliations_total",
            "Payment reconciliation outcomes",
        ),
        &["outcome"],
    )
    .expect("metric can be created");

    let bookings = IntCounter::with_opts(Opts::new(
        "portal_bookings_total",
        "Appointments booked through the portal",
    ))
    .expect("metric can be created");

    registry
        .register(Box::new(cost_fallbacks.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(reconciliations.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(bookings.clone()))
        .expect("collector can be registered");

    // Initialize globals
    let _ = REGISTRY.set(registry);
    let _ = COST_FALLBACKS_TOTAL.set(cost_fallbacks);
    let _ = RECONCILIATIONS_TOTAL.set(reconciliations);
    let _ = BOOKINGS_TOTAL.set(bookings);
}

pub fn observe_cost_fallback() {
    if let Some(counter) = COST_FALLBACKS_TOTAL.get() {
        counter.inc();
    }
}

pub fn observe_reconciliation(outcome: &str) {
    if let Some(counter) = RECONCILIATIONS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn observe_booking() {
    if let Some(counter) = BOOKINGS_TOTAL.get() {
        counter.inc();
    }
}

/// Prometheus text exposition of everything registered.
pub fn gather() -> String {
    let Some(registry) = REGISTRY.get() else {
        return String::new();
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "failed to encode metrics");
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}
