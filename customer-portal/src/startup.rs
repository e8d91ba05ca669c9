use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use portal_core::middleware::tracing::request_id_middleware;
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::AppState;
use crate::handlers::{
    app::{health_check, index},
    appointments::{cancel_appointment, list_appointments},
    auth::{login_handler, login_page, logout_handler},
    booking::{available_slots, create_appointment},
    dashboard::dashboard_summary,
    payments::{create_checkout, payment_outcome, payment_return},
};
use crate::middleware::auth::auth_middleware;

pub fn build_router(state: AppState) -> Router {
    // Session setup
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false) // Set to true in production with HTTPS
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

    let protected = Router::new()
        .route("/api/dashboard", get(dashboard_summary))
        .route(
            "/api/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route("/api/appointments/:id/cancel", post(cancel_appointment))
        .route("/api/slots", get(available_slots))
        .route("/api/payments/checkout", post(create_checkout))
        .route("/api/payments/outcome", get(payment_outcome))
        .route("/payments/return", get(payment_return))
        .layer(from_fn(auth_middleware));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(crate::handlers::metrics::metrics))
        .route("/login", get(login_page).post(login_handler))
        .route("/logout", post(logout_handler))
        .merge(protected)
        .layer(session_layer)
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    customer_id = tracing::field::Empty,
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
