use dispatch_engine::config::ScoreWeights;
use dispatch_engine::domain::coordinates::Coordinates;
use dispatch_engine::domain::dispatch::DispatchPriority;
use dispatch_engine::domain::rider::{Rider, RiderStatus};
use dispatch_engine::scoring::engine::rank_candidates;
use dispatch_engine::scoring::types::RiderCandidate;
use dispatch_engine::service::dispatch_service::prefilter_riders;
use uuid::Uuid;

fn rider(lat: f64, lng: f64, active_jobs: i64, max_active_jobs: i32) -> Rider {
    Rider {
        rider_id: Uuid::new_v4(),
        name: "rider".to_string(),
        status: RiderStatus::Available,
        lat: Some(lat),
        lng: Some(lng),
        located_at: Some(chrono::Utc::now()),
        active_jobs,
        max_active_jobs,
        rating: 4.5,
        vehicle_type: "motorbike".to_string(),
        vehicle_plate: None,
    }
}

fn dropoff() -> Coordinates {
    Coordinates::new(-1.28333, 36.81667).unwrap()
}

#[test]
fn rider_at_ceiling_is_excluded_even_if_nearest() {
    // Sits practically on the drop-off point but already holds 3 of 3 jobs.
    let saturated = rider(-1.28334, 36.81668, 3, 3);
    let free = rider(-1.30, 36.83, 0, 3);
    let free_id = free.rider_id;

    let survivors = prefilter_riders(vec![saturated, free], dropoff(), 3, Some(10.0));
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].0.rider_id, free_id);
}

#[test]
fn riders_beyond_the_radius_are_excluded() {
    let near = rider(-1.29, 36.82, 0, 3);
    let far = rider(-2.5, 37.9, 0, 3);
    let near_id = near.rider_id;

    let survivors = prefilter_riders(vec![near, far], dropoff(), 3, Some(15.0));
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].0.rider_id, near_id);
}

#[test]
fn options_ceiling_tightens_the_per_rider_limit() {
    // Rider allows 5 concurrent jobs but the request caps at 2.
    let loaded = rider(-1.29, 36.82, 2, 5);
    assert!(prefilter_riders(vec![loaded.clone()], dropoff(), 2, None).is_empty());
    assert_eq!(prefilter_riders(vec![loaded], dropoff(), 5, None).len(), 1);
}

#[test]
fn riders_without_location_are_skipped() {
    let mut ghost = rider(0.0, 0.0, 0, 3);
    ghost.lat = None;
    ghost.lng = None;
    assert!(prefilter_riders(vec![ghost], dropoff(), 3, None).is_empty());
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

fn weights() -> ScoreWeights {
    ScoreWeights {
        distance: 1.0,
        workload: 2.0,
        rating: 0.5,
    }
}

#[test]
fn minimum_score_wins_and_ranking_is_deterministic() {
    let a = candidate(2.0, 0, 4.8);
    let b = candidate(1.0, 2, 4.8);
    let c = candidate(5.0, 0, 4.8);
    let ids: Vec<Uuid> = vec![a.rider_id, b.rider_id, c.rider_id];

    let first = rank_candidates(&[a.clone(), b.clone(), c.clone()], &weights(), DispatchPriority::Normal);
    let second = rank_candidates(&[c, a, b], &weights(), DispatchPriority::Normal);

    // a: 2 + 0 + 0.104 ≈ 2.10; b: 1 + 1.33 + 0.104 ≈ 2.44; c: 5.10
    assert_eq!(first[0].candidate.rider_id, ids[0]);
    assert_eq!(
        first.iter().map(|s| s.candidate.rider_id).collect::<Vec<_>>(),
        second.iter().map(|s| s.candidate.rider_id).collect::<Vec<_>>(),
    );
}

#[test]
fn fallback_distances_still_produce_a_winner() {
    let mut a = candidate(2.0, 0, 4.8);
    let mut b = candidate(4.0, 0, 4.8);
    a.fallback_used = true;
    b.fallback_used = true;
    let a_id = a.rider_id;

    let ranked = rank_candidates(&[b, a], &weights(), DispatchPriority::Normal);
    assert_eq!(ranked[0].candidate.rider_id, a_id);
    assert!(ranked[0].candidate.fallback_used);
}
