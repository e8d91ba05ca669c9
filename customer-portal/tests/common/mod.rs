//! Common test utilities for customer-portal integration tests.
//!
//! The wiremock server stands in for both the garage API and the auth
//! service; the portal under test runs on an ephemeral port and is driven
//! through a cookie-holding reqwest client.

use customer_portal::AppState;
use customer_portal::config::{AuthServiceSettings, GarageApiSettings, ServerSettings, Settings};
use customer_portal::startup::build_router;
use secrecy::Secret;
use serde_json::{Value, json};
use std::sync::Once;
use std::sync::atomic::{AtomicU64, Ordering};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const TEST_CUSTOMER_ID: i64 = 7;
pub const TEST_ACCESS_TOKEN: &str = "test-token";

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,customer_portal=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub struct TestApp {
    pub address: String,
    pub upstream: MockServer,
    pub client: reqwest::Client,
}

/// Spawn the portal against a fresh mock upstream.
pub async fn spawn_app() -> TestApp {
    init_tracing();
    customer_portal::services::metrics::init_metrics();

    let upstream = MockServer::start().await;

    let settings = Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            session_secret: Secret::new("test-session-secret".to_string()),
        },
        auth_service: AuthServiceSettings {
            url: upstream.uri(),
        },
        garage_api: GarageApiSettings {
            base_url: upstream.uri(),
            timeout_ms: 2_000,
        },
    };

    let state = AppState::new(&settings).expect("Failed to build application state");
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind ephemeral port");
    let address = format!("http://{}", listener.local_addr().expect("local addr"));

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build test client");

    TestApp { address, upstream, client }
}

#[allow(dead_code)]
impl TestApp {
    /// Mount the auth mock and sign in, establishing a session cookie.
    pub async fn login(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": TEST_ACCESS_TOKEN,
                "customer_id": TEST_CUSTOMER_ID,
            })))
            .mount(&self.upstream)
            .await;

        let response = self
            .client
            .post(format!("{}/login", self.address))
            .json(&json!({
                "email": "customer@example.com",
                "password": "hunter2-but-longer",
            }))
            .send()
            .await
            .expect("login request failed");

        assert!(response.status().is_success(), "login failed");
    }

    pub async fn get(&self, route: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, route))
            .send()
            .await
            .expect("request failed")
    }

    pub async fn get_json(&self, route: &str) -> Value {
        let response = self.get(route).await;
        assert!(
            response.status().is_success(),
            "GET {} returned {}",
            route,
            response.status()
        );
        response.json().await.expect("invalid JSON body")
    }
}

/// Responder that fails with the given status a fixed number of times, then
/// answers 200 with a JSON body.
#[allow(dead_code)]
pub struct FlakyJson {
    failures: u64,
    failure_status: u16,
    success_body: Value,
    calls: AtomicU64,
}

#[allow(dead_code)]
impl FlakyJson {
    pub fn new(failures: u64, failure_status: u16, success_body: Value) -> Self {
        Self {
            failures,
            failure_status,
            success_body,
            calls: AtomicU64::new(0),
        }
    }
}

impl Respond for FlakyJson {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            ResponseTemplate::new(self.failure_status)
        } else {
            ResponseTemplate::new(200).set_body_json(self.success_body.clone())
        }
    }
}

/// Responder whose body switches after a fixed number of calls.
#[allow(dead_code)]
pub struct StagedJson {
    initial: Value,
    initial_calls: u64,
    later: Value,
    calls: AtomicU64,
}

#[allow(dead_code)]
impl StagedJson {
    pub fn new(initial: Value, initial_calls: u64, later: Value) -> Self {
        Self {
            initial,
            initial_calls,
            later,
            calls: AtomicU64::new(0),
        }
    }
}

impl Respond for StagedJson {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.initial_calls {
            ResponseTemplate::new(200).set_body_json(self.initial.clone())
        } else {
            ResponseTemplate::new(200).set_body_json(self.later.clone())
        }
    }
}

#[allow(dead_code)]
pub fn appointment_json(
    id: i64,
    date: &str,
    status: &str,
    estimated: Option<i64>,
    actual: Option<i64>,
) -> Value {
    json!({
        "id": id,
        "appointment_date": format!("{date}T10:00:00"),
        "customer_id": TEST_CUSTOMER_ID,
        "vehicle_id": 1,
        "service_id": 1,
        "status": { "id": null, "name": status },
        "description": "routine service visit",
        "estimated_budget": estimated,
        "actual_budget": actual,
        "extra_services": []
    })
}

#[allow(dead_code)]
pub fn vehicle_json(id: i64, deleted: bool) -> Value {
    json!({
        "id": id,
        "plate": format!("AB-{:03}-CD", id),
        "brand": "Opel",
        "model": "Astra",
        "kilometers": 80_000,
        "customer_id": TEST_CUSTOMER_ID,
        "deleted_at": if deleted { json!("2024-12-01T09:00:00") } else { Value::Null },
    })
}

#[allow(dead_code)]
pub fn breakdown_json(base: i64, extras: &[i64]) -> Value {
    let total: i64 = base + extras.iter().sum::<i64>();
    json!({
        "base_service": {
            "name": "Base service",
            "labor_cost": base,
            "parts": [],
            "subtotal": base,
        },
        "extra_services": extras.iter().map(|cost| json!({
            "name": "Extra",
            "labor_cost": cost,
            "parts": [],
            "subtotal": cost,
        })).collect::<Vec<_>>(),
        "total": total,
    })
}

#[allow(dead_code)]
pub fn invoice_json(appointment_id: i64, invoice_number: &str) -> Value {
    json!({
        "id": 900 + appointment_id,
        "invoiceNumber": invoice_number,
        "appointmentId": appointment_id,
        "issuedAt": "2025-03-10T12:00:00",
        "clientName": "Ada Lovelace",
        "items": [],
        "subtotal": 100,
        "tax": 21,
        "total": 121,
        "status": "paid",
        "paymentMethod": "card",
        "paymentIntentId": "pi_123",
    })
}
