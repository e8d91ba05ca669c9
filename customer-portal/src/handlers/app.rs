use axum::Json;
use axum::response::IntoResponse;

pub async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "customer-portal",
        "status": "ok",
    }))
}

pub async fn health_check() -> &'static str {
    "OK"
}
