use crate::cache::distance_cache::DistanceCache;
use crate::config::EngineSettings;
use crate::domain::coordinates::Coordinates;
use crate::domain::dispatch::{
    AssignmentOutcome, DispatchAuditRecord, DispatchCandidateResult, DispatchOptions, RiderSelection,
};
use crate::domain::rider::Rider;
use crate::error::EngineError;
use crate::pricing::calculator::round2;
use crate::repo::deliveries_repo::DeliveriesRepo;
use crate::repo::dispatch_audit_repo::DispatchAuditRepo;
use crate::repo::riders_repo::RidersRepo;
use crate::routing::TravelMode;
use crate::scoring::engine::rank_candidates;
use crate::scoring::types::RiderCandidate;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct DispatchService {
    pub pool: PgPool,
    pub riders_repo: RidersRepo,
    pub deliveries_repo: DeliveriesRepo,
    pub audit_repo: DispatchAuditRepo,
    pub cache: DistanceCache,
    pub settings: EngineSettings,
}

/// Selection plus the full ranked slate, which is returned to callers but
/// never persisted.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RiderEvaluation {
    pub selection: RiderSelection,
    pub candidates: Vec<DispatchCandidateResult>,
}

impl DispatchService {
    /// Score the candidate pool for a drop-off point and pick the optimum.
    /// Writes a dispatch audit row before returning, mirroring the pricing
    /// durability rule.
    pub async fn find_optimal_rider(
        &self,
        dropoff: Coordinates,
        options: &DispatchOptions,
    ) -> Result<RiderEvaluation, EngineError> {
        let eval = self.evaluate(dropoff, options).await?;
        let record = self.audit_record(None, &eval.selection);
        self.audit_repo.insert(&record).await?;
        Ok(eval)
    }

    /// Assign a pending delivery to the best rider. The decision point is a
    /// single conditional update judged by affected rows; losing the race
    /// yields `AlreadyAssigned`, never a double assignment. Audit row and
    /// rider status refresh commit atomically with the assignment.
    pub async fn auto_assign_delivery(
        &self,
        delivery_id: Uuid,
        options: &DispatchOptions,
    ) -> Result<AssignmentOutcome, EngineError> {
        let delivery = self
            .deliveries_repo
            .get(delivery_id)
            .await?
            .ok_or_else(|| EngineError::not_found(format!("delivery {delivery_id}")))?;

        let dropoff = Coordinates::new(delivery.dropoff_lat, delivery.dropoff_lng)?;
        let eval = self.evaluate(dropoff, options).await?;
        let rider = &eval.selection.rider;

        let mut tx = self.pool.begin().await.map_err(anyhow::Error::from)?;
        let won = DeliveriesRepo::assign_if_pending_tx(&mut tx, delivery_id, rider.rider_id).await?;
        if !won {
            tracing::info!(%delivery_id, "delivery no longer pending, skipping assignment");
            return Ok(AssignmentOutcome::AlreadyAssigned { delivery_id });
        }

        let record = self.audit_record(Some(delivery_id), &eval.selection);
        DispatchAuditRepo::insert_tx(&mut tx, &record).await?;
        RidersRepo::refresh_status_tx(&mut tx, rider.rider_id, rider.max_active_jobs).await?;
        tx.commit().await.map_err(anyhow::Error::from)?;

        Ok(AssignmentOutcome::Assigned {
            delivery_id,
            rider_id: rider.rider_id,
            score: eval.selection.score,
            distance_km: eval.selection.distance_km,
            candidates_evaluated: eval.selection.candidates_evaluated,
        })
    }

    async fn evaluate(
        &self,
        dropoff: Coordinates,
        options: &DispatchOptions,
    ) -> Result<RiderEvaluation, EngineError> {
        let riders = self.riders_repo.list_dispatchable().await?;
        let global_ceiling = options
            .max_active_deliveries
            .unwrap_or(self.settings.rider_job_ceiling);

        let mut prefiltered = prefilter_riders(riders, dropoff, global_ceiling, options.max_distance_km);
        if prefiltered.is_empty() {
            return Err(EngineError::NoRidersAvailable);
        }

        prefiltered.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));
        prefiltered.truncate(self.settings.max_candidates_scored);

        let origins: Vec<Coordinates> = prefiltered.iter().map(|(_, loc, _)| *loc).collect();
        let lookups = self
            .cache
            .get_or_compute_many(&origins, dropoff, TravelMode::Driving)
            .await;

        let mut candidates = Vec::with_capacity(prefiltered.len());
        for ((rider, _, _), lookup) in prefiltered.iter().zip(lookups.iter()) {
            let distance_km = round2(lookup.distance_m / 1000.0);
            // Precise distance can exceed the crow-flies radius; the option
            // bounds the pre-filter, the score handles the rest.
            candidates.push(RiderCandidate {
                rider_id: rider.rider_id,
                status: rider.status,
                distance_km,
                duration_min: round2(lookup.duration_s / 60.0),
                active_jobs: rider.active_jobs,
                max_active_jobs: global_ceiling.min(rider.max_active_jobs),
                rating: rider.rating,
                fallback_used: lookup.fallback_used,
            });
        }

        let ranked = rank_candidates(&candidates, &self.settings.score_weights, options.priority);
        let winner = ranked.first().ok_or(EngineError::NoRidersAvailable)?;
        let rider = prefiltered
            .iter()
            .map(|(r, _, _)| r)
            .find(|r| r.rider_id == winner.candidate.rider_id)
            .cloned()
            .ok_or_else(|| EngineError::Internal(anyhow::anyhow!("winner missing from pool")))?;

        if winner.candidate.fallback_used {
            tracing::warn!(rider_id = %rider.rider_id, "selected rider scored on great-circle fallback distance");
        }

        let candidate_results: Vec<DispatchCandidateResult> = ranked
            .iter()
            .map(|s| DispatchCandidateResult {
                rider_id: s.candidate.rider_id,
                distance_km: s.candidate.distance_km,
                duration_min: s.candidate.duration_min,
                active_jobs: s.candidate.active_jobs,
                score: s.score,
                rank: s.rank,
            })
            .collect();

        Ok(RiderEvaluation {
            selection: RiderSelection {
                score: winner.score,
                distance_km: winner.candidate.distance_km,
                duration_min: winner.candidate.duration_min,
                candidates_evaluated: candidates.len(),
                fallback_used: winner.candidate.fallback_used,
                rider,
            },
            candidates: candidate_results,
        })
    }

    fn audit_record(&self, delivery_id: Option<Uuid>, selection: &RiderSelection) -> DispatchAuditRecord {
        DispatchAuditRecord {
            audit_id: Uuid::new_v4(),
            delivery_id,
            rider_id: selection.rider.rider_id,
            candidates_evaluated: selection.candidates_evaluated as i32,
            selection_score: selection.score,
            distance_meters: selection.distance_km * 1000.0,
            duration_seconds: selection.duration_min * 60.0,
            fallback_used: selection.fallback_used,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Cheap great-circle pre-filter ahead of any provider traffic: drops riders
/// with no usable location, at or over their effective job ceiling, or
/// outside the requested radius. Returns (rider, location, crow-flies km).
pub fn prefilter_riders(
    riders: Vec<Rider>,
    dropoff: Coordinates,
    global_ceiling: i32,
    max_distance_km: Option<f64>,
) -> Vec<(Rider, Coordinates, f64)> {
    let mut out = Vec::new();
    for rider in riders {
        let (Some(lat), Some(lng)) = (rider.lat, rider.lng) else {
            continue;
        };
        let Ok(location) = Coordinates::new(lat, lng) else {
            continue;
        };
        let ceiling = global_ceiling.min(rider.max_active_jobs);
        if rider.active_jobs >= ceiling as i64 {
            continue;
        }
        let crow_km = location.haversine_km(&dropoff);
        if let Some(max_km) = max_distance_km {
            if crow_km > max_km {
                continue;
            }
        }
        out.push((rider, location, crow_km));
    }
    out
}
