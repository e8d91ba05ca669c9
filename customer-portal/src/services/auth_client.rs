//! Auth service client.
//!
//! The portal never validates credentials itself; it proxies the login call
//! and keeps only the returned identity in the session.

use crate::config::AuthServiceSettings;
use portal_core::error::AppError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub struct AuthClient {
    client: Client,
    settings: AuthServiceSettings,
}

#[derive(Debug, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub customer_id: i64,
}

impl AuthClient {
    pub fn new(settings: AuthServiceSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, AppError> {
        let url = format!("{}/auth/login", self.settings.url);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "auth service unreachable");
                AppError::BadGateway(format!("auth service unreachable: {e}"))
            })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::Unauthorized(anyhow::anyhow!(
                "invalid credentials"
            )));
        }
        if !response.status().is_success() {
            return Err(AppError::BadGateway(format!(
                "auth service returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::BadGateway(format!("malformed auth response: {e}")))
    }
}
