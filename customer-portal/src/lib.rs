pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use crate::config::Settings;
use services::{
    auth_client::AuthClient, costs::CostAggregator, garage_api::GarageApiClient,
    reconciliation::PaymentReconciler,
};
use std::sync::Arc;

/// Shared application state containing service clients.
#[derive(Clone)]
pub struct AppState {
    pub auth_client: Arc<AuthClient>,
    pub garage_api: Arc<GarageApiClient>,
    pub costs: CostAggregator<GarageApiClient>,
    pub reconciler: PaymentReconciler<GarageApiClient>,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let garage_api = Arc::new(GarageApiClient::new(settings.garage_api.clone())?);
        let auth_client = Arc::new(AuthClient::new(settings.auth_service.clone()));
        let costs = CostAggregator::new(garage_api.clone());
        let reconciler = PaymentReconciler::new(garage_api.clone());

        Ok(Self {
            auth_client,
            garage_api,
            costs,
            reconciler,
        })
    }
}
