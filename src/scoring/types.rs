use crate::domain::rider::RiderStatus;
use uuid::Uuid;

/// Scoring input for one rider, distances already resolved.
#[derive(Debug, Clone)]
pub struct RiderCandidate {
    pub rider_id: Uuid,
    pub status: RiderStatus,
    pub distance_km: f64,
    pub duration_min: f64,
    pub active_jobs: i64,
    pub max_active_jobs: i32,
    pub rating: f64,
    pub fallback_used: bool,
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: RiderCandidate,
    pub score: f64,
    pub rank: usize,
}
