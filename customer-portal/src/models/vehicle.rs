use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub kilometers: i64,
    pub customer_id: i64,
    /// Soft-delete marker; set means the vehicle is excluded from all
    /// active counts and listings.
    #[serde(default)]
    pub deleted_at: Option<NaiveDateTime>,
}

impl Vehicle {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
