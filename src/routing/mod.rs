use crate::domain::coordinates::Coordinates;

pub mod mock;
pub mod osrm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Driving,
    Cycling,
    Walking,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Cycling => "cycling",
            Self::Walking => "walking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Typed provider failure so callers can engage the fallback estimator.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("provider timed out")]
    Timeout,
    #[error("provider returned HTTP {0}")]
    Http(u16),
    #[error("provider rejected the request: {0}")]
    Provider(String),
    #[error("could not decode provider response: {0}")]
    Decode(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("no result for the requested location")]
    NoResult,
}

#[async_trait::async_trait]
pub trait RoutingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn geocode(&self, address: &str) -> Result<Coordinates, RoutingError>;

    async fn compute_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        mode: TravelMode,
    ) -> Result<RouteSummary, RoutingError>;

    /// One row per origin, one column per destination. `None` cells are
    /// unroutable pairs; callers fall back per pair.
    async fn distance_matrix(
        &self,
        origins: &[Coordinates],
        destinations: &[Coordinates],
        mode: TravelMode,
    ) -> Result<Vec<Vec<Option<RouteSummary>>>, RoutingError>;
}
