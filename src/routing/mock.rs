use crate::domain::coordinates::Coordinates;
use crate::routing::{RouteSummary, RoutingError, RoutingProvider, TravelMode};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Deterministic provider for tests: answers with haversine distance at a
/// fixed road speed, counts calls, and can be switched to hard failure.
pub struct MockRoutingProvider {
    pub speed_kmh: f64,
    pub road_factor: f64,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockRoutingProvider {
    pub fn new() -> Self {
        Self {
            speed_kmh: 30.0,
            road_factor: 1.2,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn summarize(&self, origin: Coordinates, destination: Coordinates) -> RouteSummary {
        let distance_m = origin.haversine_km(&destination) * self.road_factor * 1000.0;
        let duration_s = distance_m / 1000.0 / self.speed_kmh * 3600.0;
        RouteSummary {
            distance_m,
            duration_s,
        }
    }

    fn check(&self) -> Result<(), RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(RoutingError::Timeout)
        } else {
            Ok(())
        }
    }
}

impl Default for MockRoutingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RoutingProvider for MockRoutingProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn geocode(&self, _address: &str) -> Result<Coordinates, RoutingError> {
        self.check()?;
        Coordinates::new(0.0, 0.0).map_err(|_| RoutingError::NoResult)
    }

    async fn compute_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        _mode: TravelMode,
    ) -> Result<RouteSummary, RoutingError> {
        self.check()?;
        Ok(self.summarize(origin, destination))
    }

    async fn distance_matrix(
        &self,
        origins: &[Coordinates],
        destinations: &[Coordinates],
        _mode: TravelMode,
    ) -> Result<Vec<Vec<Option<RouteSummary>>>, RoutingError> {
        self.check()?;
        Ok(origins
            .iter()
            .map(|o| destinations.iter().map(|d| Some(self.summarize(*o, *d))).collect())
            .collect())
    }
}
