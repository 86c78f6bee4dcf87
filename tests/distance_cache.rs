use dispatch_engine::cache::distance_cache::DistanceCache;
use dispatch_engine::domain::coordinates::Coordinates;
use dispatch_engine::routing::mock::MockRoutingProvider;
use dispatch_engine::routing::TravelMode;
use std::sync::Arc;
use std::time::Duration;

fn cache(provider: Arc<MockRoutingProvider>, ttl_secs: u64, fallback_ttl_secs: u64) -> DistanceCache {
    DistanceCache::new(provider, Duration::from_secs(ttl_secs), Duration::from_secs(fallback_ttl_secs), 1.3, 4)
}

fn nairobi() -> Coordinates {
    Coordinates::new(-1.28333, 36.81667).unwrap()
}

fn westlands() -> Coordinates {
    Coordinates::new(-1.26361, 36.80222).unwrap()
}

#[tokio::test]
async fn second_lookup_within_ttl_hits_without_provider_call() {
    let provider = Arc::new(MockRoutingProvider::new());
    let cache = cache(provider.clone(), 600, 30);

    let first = cache.get_or_compute(nairobi(), westlands(), TravelMode::Driving).await;
    assert!(!first.cache_hit);
    assert_eq!(provider.calls(), 1);

    let second = cache.get_or_compute(nairobi(), westlands(), TravelMode::Driving).await;
    assert!(second.cache_hit);
    assert!(!second.fallback_used);
    assert_eq!(second.distance_m, first.distance_m);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn nearby_coordinates_share_a_cache_entry() {
    let provider = Arc::new(MockRoutingProvider::new());
    let cache = cache(provider.clone(), 600, 30);

    cache.get_or_compute(nairobi(), westlands(), TravelMode::Driving).await;
    // ~1e-5 degrees apart, inside the 4-decimal rounding bucket.
    let nudged = Coordinates::new(-1.283332, 36.816668).unwrap();
    let hit = cache.get_or_compute(nudged, westlands(), TravelMode::Driving).await;
    assert!(hit.cache_hit);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn provider_outage_degrades_to_great_circle_estimate() {
    let provider = Arc::new(MockRoutingProvider::new());
    provider.set_failing(true);
    let cache = cache(provider.clone(), 600, 30);

    let lookup = cache.get_or_compute(nairobi(), westlands(), TravelMode::Driving).await;
    assert!(lookup.fallback_used);
    assert_eq!(lookup.provider, "great_circle");

    let expected = nairobi().haversine_km(&westlands()) * 1.3 * 1000.0;
    assert!((lookup.distance_m - expected).abs() < 1.0);
}

#[tokio::test]
async fn cache_self_heals_after_provider_recovers() {
    let provider = Arc::new(MockRoutingProvider::new());
    provider.set_failing(true);
    // Zero fallback TTL: degraded results are not cached at all.
    let cache = cache(provider.clone(), 600, 0);

    let degraded = cache.get_or_compute(nairobi(), westlands(), TravelMode::Driving).await;
    assert!(degraded.fallback_used);

    provider.set_failing(false);
    let recovered = cache.get_or_compute(nairobi(), westlands(), TravelMode::Driving).await;
    assert!(!recovered.cache_hit);
    assert!(!recovered.fallback_used);
    assert_eq!(recovered.provider, "mock");
}

#[tokio::test]
async fn matrix_resolves_misses_in_one_call_and_caches_them() {
    let provider = Arc::new(MockRoutingProvider::new());
    let cache = cache(provider.clone(), 600, 30);

    let origins = vec![
        Coordinates::new(-1.28, 36.81).unwrap(),
        Coordinates::new(-1.29, 36.82).unwrap(),
        Coordinates::new(-1.30, 36.83).unwrap(),
    ];
    let first = cache.get_or_compute_many(&origins, westlands(), TravelMode::Driving).await;
    assert_eq!(first.len(), 3);
    assert!(first.iter().all(|l| !l.cache_hit));
    assert_eq!(provider.calls(), 1);

    let second = cache.get_or_compute_many(&origins, westlands(), TravelMode::Driving).await;
    assert!(second.iter().all(|l| l.cache_hit));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn matrix_outage_degrades_every_miss() {
    let provider = Arc::new(MockRoutingProvider::new());
    provider.set_failing(true);
    let cache = cache(provider.clone(), 600, 30);

    let origins = vec![
        Coordinates::new(-1.28, 36.81).unwrap(),
        Coordinates::new(-1.29, 36.82).unwrap(),
    ];
    let lookups = cache.get_or_compute_many(&origins, westlands(), TravelMode::Driving).await;
    assert!(lookups.iter().all(|l| l.fallback_used));
    assert!(lookups.iter().all(|l| l.distance_m > 0.0));
}

#[tokio::test]
async fn travel_modes_key_separate_entries() {
    let provider = Arc::new(MockRoutingProvider::new());
    let cache = cache(provider.clone(), 600, 30);

    cache.get_or_compute(nairobi(), westlands(), TravelMode::Driving).await;
    let cycling = cache.get_or_compute(nairobi(), westlands(), TravelMode::Cycling).await;
    let walking = cache.get_or_compute(nairobi(), westlands(), TravelMode::Walking).await;

    assert!(!cycling.cache_hit);
    assert!(!walking.cache_hit);
    assert_eq!(cache.len().await, 3);
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn purge_empties_the_cache() {
    let provider = Arc::new(MockRoutingProvider::new());
    let cache = cache(provider.clone(), 600, 30);

    cache.get_or_compute(nairobi(), westlands(), TravelMode::Driving).await;
    assert_eq!(cache.len().await, 1);

    assert_eq!(cache.purge().await, 1);
    assert_eq!(cache.len().await, 0);

    let after = cache.get_or_compute(nairobi(), westlands(), TravelMode::Driving).await;
    assert!(!after.cache_hit);
    assert_eq!(provider.calls(), 2);
}
