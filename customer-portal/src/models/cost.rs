//! Cost breakdown returned by `GET /appointments/{id}/cost-breakdown`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartLine {
    pub name: String,
    #[serde(default)]
    pub part_number: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total: Decimal,
}

/// Itemized labor and parts for one service on an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceBreakdown {
    pub name: String,
    pub labor_cost: Decimal,
    #[serde(default)]
    pub parts: Vec<PartLine>,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub base_service: ServiceBreakdown,
    #[serde(default)]
    pub extra_services: Vec<ServiceBreakdown>,
    /// The provider's own total; trusted for display.
    pub total: Decimal,
}

impl CostBreakdown {
    /// Sum of the base and extra subtotals. `total` must equal this.
    pub fn computed_total(&self) -> Decimal {
        self.base_service.subtotal
            + self
                .extra_services
                .iter()
                .map(|s| s.subtotal)
                .sum::<Decimal>()
    }
}
