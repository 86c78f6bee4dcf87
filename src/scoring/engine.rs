use crate::config::ScoreWeights;
use crate::domain::dispatch::DispatchPriority;
use crate::domain::rider::RiderStatus;
use crate::scoring::types::{RiderCandidate, ScoredCandidate};

/// Ratings below this are clamped so 1/rating stays bounded.
const MIN_RATING: f64 = 0.5;

pub fn score_candidate(
    candidate: &RiderCandidate,
    weights: &ScoreWeights,
    priority: DispatchPriority,
) -> f64 {
    let distance_weight = match priority {
        // Urgent deliveries care less about raw distance and more about who
        // can actually start now.
        DispatchPriority::Urgent => weights.distance * 0.5,
        DispatchPriority::Normal => weights.distance,
    };

    let workload = candidate.active_jobs as f64 / candidate.max_active_jobs.max(1) as f64;
    let rating = candidate.rating.max(MIN_RATING);

    distance_weight * candidate.distance_km + weights.workload * workload + weights.rating * (1.0 / rating)
}

/// Rank candidates ascending by score and pick the minimum. Ties break by
/// lowest active_jobs, then rider id, so repeated runs over the same inputs
/// select the same rider. Urgent priority restricts to riders whose stored
/// status is `available` whenever at least one such rider survives.
pub fn rank_candidates(
    candidates: &[RiderCandidate],
    weights: &ScoreWeights,
    priority: DispatchPriority,
) -> Vec<ScoredCandidate> {
    let pool: Vec<&RiderCandidate> = if priority == DispatchPriority::Urgent
        && candidates.iter().any(|c| c.status == RiderStatus::Available)
    {
        candidates.iter().filter(|c| c.status == RiderStatus::Available).collect()
    } else {
        candidates.iter().collect()
    };

    let mut scored: Vec<ScoredCandidate> = pool
        .into_iter()
        .map(|c| ScoredCandidate {
            score: score_candidate(c, weights, priority),
            candidate: c.clone(),
            rank: 0,
        })
        .collect();

    scored.sort_by(|a, b| {
        a.score
            .partial_cmp(&b.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.candidate.active_jobs.cmp(&b.candidate.active_jobs))
            .then_with(|| a.candidate.rider_id.cmp(&b.candidate.rider_id))
    });

    for (i, s) in scored.iter_mut().enumerate() {
        s.rank = i + 1;
    }
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn weights() -> ScoreWeights {
        ScoreWeights {
            distance: 1.0,
            workload: 2.0,
            rating: 0.5,
        }
    }

    fn candidate(distance_km: f64, active_jobs: i64, rating: f64) -> RiderCandidate {
        RiderCandidate {
            rider_id: Uuid::new_v4(),
            status: RiderStatus::Available,
            distance_km,
            duration_min: distance_km * 2.0,
            active_jobs,
            max_active_jobs: 3,
            rating,
            fallback_used: false,
        }
    }

    #[test]
    fn closer_idle_rider_wins() {
        let near_idle = candidate(1.0, 0, 4.5);
        let far_loaded = candidate(6.0, 2, 4.8);
        let ranked = rank_candidates(&[far_loaded, near_idle.clone()], &weights(), DispatchPriority::Normal);
        assert_eq!(ranked[0].candidate.rider_id, near_idle.rider_id);
        assert!(ranked[0].score < ranked[1].score);
    }

    #[test]
    fn ties_break_by_workload_then_id() {
        // Workload weight zeroed so the two scores tie exactly despite the
        // different job counts.
        let no_workload = ScoreWeights {
            distance: 1.0,
            workload: 0.0,
            rating: 0.5,
        };
        let a = candidate(2.0, 1, 5.0);
        let b = candidate(2.0, 0, 5.0);
        let ranked = rank_candidates(&[a, b.clone()], &no_workload, DispatchPriority::Normal);
        assert_eq!(ranked[0].candidate.rider_id, b.rider_id);

        let c = candidate(2.0, 0, 5.0);
        let d = candidate(2.0, 0, 5.0);
        let low_id = c.rider_id.min(d.rider_id);
        let ranked = rank_candidates(&[c, d], &weights(), DispatchPriority::Normal);
        assert_eq!(ranked[0].candidate.rider_id, low_id);
    }

    #[test]
    fn urgent_prefers_available_status() {
        let mut busy_near = candidate(0.5, 1, 5.0);
        busy_near.status = RiderStatus::Busy;
        let available_far = candidate(4.0, 0, 5.0);

        let normal = rank_candidates(
            &[busy_near.clone(), available_far.clone()],
            &weights(),
            DispatchPriority::Normal,
        );
        assert_eq!(normal[0].candidate.rider_id, busy_near.rider_id);

        let urgent = rank_candidates(&[busy_near, available_far.clone()], &weights(), DispatchPriority::Urgent);
        assert_eq!(urgent[0].candidate.rider_id, available_far.rider_id);
    }

    #[test]
    fn zero_rating_does_not_blow_up() {
        let c = candidate(1.0, 0, 0.0);
        let score = score_candidate(&c, &weights(), DispatchPriority::Normal);
        assert!(score.is_finite());
    }

    #[test]
    fn ranks_are_sequential() {
        let ranked = rank_candidates(
            &[candidate(1.0, 0, 5.0), candidate(2.0, 1, 4.0), candidate(3.0, 2, 3.0)],
            &weights(),
            DispatchPriority::Normal,
        );
        let ranks: Vec<usize> = ranked.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }
}
