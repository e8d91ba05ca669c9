//! Appointment status vocabulary.
//!
//! The upstream API reports status as a `{id, name}` pair and is loose about
//! the name: historic records carry the misspelling "waitting payment" and
//! both "canceled"/"cancelled". Everything funnels through one
//! canonicalization table here so the rest of the portal only ever sees the
//! closed enum.

use serde::{Deserialize, Serialize};

/// Status as reported by the upstream API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRef {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

/// Lifecycle bucket an appointment is presented under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    /// Bookable or payable; shown in the upcoming view.
    Future,
    /// Terminal; shown in the history view.
    Past,
    /// In the workshop pipeline; currently shown in neither view.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    AwaitingApproval,
    InRepair,
    WaitingPayment,
    Finalized,
    Canceled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::AwaitingApproval => "awaiting approval",
            AppointmentStatus::InRepair => "in repair",
            AppointmentStatus::WaitingPayment => "waiting payment",
            AppointmentStatus::Finalized => "finalized",
            AppointmentStatus::Canceled => "canceled",
        }
    }

    /// Canonicalize a free-text status name.
    ///
    /// "waitting-payment" is a misspelling still present in upstream
    /// records; "completed" and "in-progress" appear in older exports.
    pub fn from_name(name: &str) -> Option<Self> {
        match normalize_label(name).as_str() {
            "pending" => Some(AppointmentStatus::Pending),
            "awaiting-approval" => Some(AppointmentStatus::AwaitingApproval),
            "in-repair" | "in-progress" => Some(AppointmentStatus::InRepair),
            "waiting-payment" | "waitting-payment" => Some(AppointmentStatus::WaitingPayment),
            "finalized" | "completed" => Some(AppointmentStatus::Finalized),
            "canceled" | "cancelled" => Some(AppointmentStatus::Canceled),
            _ => None,
        }
    }

    /// Numeric ids follow lifecycle order, 1 through 6.
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(AppointmentStatus::Pending),
            2 => Some(AppointmentStatus::AwaitingApproval),
            3 => Some(AppointmentStatus::InRepair),
            4 => Some(AppointmentStatus::WaitingPayment),
            5 => Some(AppointmentStatus::Finalized),
            6 => Some(AppointmentStatus::Canceled),
            _ => None,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            AppointmentStatus::Pending => 1,
            AppointmentStatus::AwaitingApproval => 2,
            AppointmentStatus::InRepair => 3,
            AppointmentStatus::WaitingPayment => 4,
            AppointmentStatus::Finalized => 5,
            AppointmentStatus::Canceled => 6,
        }
    }

    /// Resolve an upstream status reference, id first, then name.
    pub fn resolve(status: &StatusRef) -> Option<Self> {
        status
            .id
            .and_then(Self::from_id)
            .or_else(|| Self::from_name(&status.name))
    }

    pub fn bucket(&self) -> StatusBucket {
        match self {
            AppointmentStatus::Pending | AppointmentStatus::WaitingPayment => StatusBucket::Future,
            AppointmentStatus::Finalized | AppointmentStatus::Canceled => StatusBucket::Past,
            AppointmentStatus::AwaitingApproval | AppointmentStatus::InRepair => {
                StatusBucket::Other
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Finalized | AppointmentStatus::Canceled
        )
    }

    pub fn is_cancellable(&self) -> bool {
        !matches!(
            self,
            AppointmentStatus::Finalized | AppointmentStatus::Canceled | AppointmentStatus::InRepair
        )
    }
}

/// Cancellation eligibility for a raw status label.
///
/// Labels outside the closed vocabulary default to cancellable; only the
/// known terminal and in-workshop states block a cancel request.
pub fn cancellable_label(name: &str) -> bool {
    const NOT_CANCELLABLE: [&str; 6] = [
        "completed",
        "finalized",
        "canceled",
        "cancelled",
        "in-repair",
        "in-progress",
    ];
    !NOT_CANCELLABLE.contains(&normalize_label(name).as_str())
}

fn normalize_label(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_follow_lifecycle() {
        assert_eq!(AppointmentStatus::Pending.bucket(), StatusBucket::Future);
        assert_eq!(
            AppointmentStatus::WaitingPayment.bucket(),
            StatusBucket::Future
        );
        assert_eq!(AppointmentStatus::Finalized.bucket(), StatusBucket::Past);
        assert_eq!(AppointmentStatus::Canceled.bucket(), StatusBucket::Past);
        assert_eq!(
            AppointmentStatus::AwaitingApproval.bucket(),
            StatusBucket::Other
        );
        assert_eq!(AppointmentStatus::InRepair.bucket(), StatusBucket::Other);
    }

    #[test]
    fn canonicalizes_legacy_spellings() {
        assert_eq!(
            AppointmentStatus::from_name("Waitting Payment"),
            Some(AppointmentStatus::WaitingPayment)
        );
        assert_eq!(
            AppointmentStatus::from_name("waiting payment"),
            Some(AppointmentStatus::WaitingPayment)
        );
        assert_eq!(
            AppointmentStatus::from_name("CANCELLED"),
            Some(AppointmentStatus::Canceled)
        );
        assert_eq!(
            AppointmentStatus::from_name("  In   Repair "),
            Some(AppointmentStatus::InRepair)
        );
        assert_eq!(
            AppointmentStatus::from_name("completed"),
            Some(AppointmentStatus::Finalized)
        );
        assert_eq!(AppointmentStatus::from_name("repainting"), None);
    }

    #[test]
    fn resolves_id_before_name() {
        let status = StatusRef {
            id: Some(4),
            name: "something stale".to_string(),
        };
        assert_eq!(
            AppointmentStatus::resolve(&status),
            Some(AppointmentStatus::WaitingPayment)
        );

        let by_name = StatusRef {
            id: None,
            name: "finalized".to_string(),
        };
        assert_eq!(
            AppointmentStatus::resolve(&by_name),
            Some(AppointmentStatus::Finalized)
        );
    }

    #[test]
    fn cancellation_eligibility() {
        assert!(!AppointmentStatus::InRepair.is_cancellable());
        assert!(!AppointmentStatus::Finalized.is_cancellable());
        assert!(!AppointmentStatus::Canceled.is_cancellable());
        assert!(AppointmentStatus::Pending.is_cancellable());
        assert!(AppointmentStatus::AwaitingApproval.is_cancellable());
        assert!(AppointmentStatus::WaitingPayment.is_cancellable());
    }

    #[test]
    fn cancellable_label_uses_blacklist() {
        assert!(!cancellable_label("in repair"));
        assert!(!cancellable_label("In Progress"));
        assert!(!cancellable_label("cancelled"));
        assert!(cancellable_label("pending"));
        assert!(cancellable_label("waitting payment"));
        // Unknown labels default to cancellable.
        assert!(cancellable_label("mystery state"));
    }
}
