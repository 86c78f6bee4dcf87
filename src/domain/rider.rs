use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiderStatus {
    Available,
    Busy,
    Offline,
}

impl RiderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::Offline => "offline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "busy" => Some(Self::Busy),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }
}

/// Rider with workload derived from live delivery rows at read time. The
/// `active_jobs` field is never stored as its own counter.
#[derive(Debug, Clone, Serialize)]
pub struct Rider {
    pub rider_id: Uuid,
    pub name: String,
    pub status: RiderStatus,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub located_at: Option<chrono::DateTime<chrono::Utc>>,
    pub active_jobs: i64,
    pub max_active_jobs: i32,
    pub rating: f64,
    pub vehicle_type: String,
    pub vehicle_plate: Option<String>,
}
