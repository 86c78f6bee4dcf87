use crate::domain::rider::Rider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPriority {
    Normal,
    Urgent,
}

impl Default for DispatchPriority {
    fn default() -> Self {
        Self::Normal
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchOptions {
    #[serde(default)]
    pub priority: DispatchPriority,
    pub max_active_deliveries: Option<i32>,
    pub max_distance_km: Option<f64>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            priority: DispatchPriority::Normal,
            max_active_deliveries: None,
            max_distance_km: None,
        }
    }
}

/// Per-rider evaluation produced while picking a winner. Transient; only the
/// winning line makes it into the audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchCandidateResult {
    pub rider_id: Uuid,
    pub distance_km: f64,
    pub duration_min: f64,
    pub active_jobs: i64,
    pub score: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiderSelection {
    pub rider: Rider,
    pub score: f64,
    pub distance_km: f64,
    pub duration_min: f64,
    pub candidates_evaluated: usize,
    pub fallback_used: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssignmentOutcome {
    Assigned {
        delivery_id: Uuid,
        rider_id: Uuid,
        score: f64,
        distance_km: f64,
        candidates_evaluated: usize,
    },
    AlreadyAssigned {
        delivery_id: Uuid,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchAuditRecord {
    pub audit_id: Uuid,
    pub delivery_id: Option<Uuid>,
    pub rider_id: Uuid,
    pub candidates_evaluated: i32,
    pub selection_score: f64,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub fallback_used: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub delivery_id: Uuid,
    pub order_id: Option<Uuid>,
    pub rider_id: Option<Uuid>,
    pub status: String,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub dropoff_lat: f64,
    pub dropoff_lng: f64,
}
