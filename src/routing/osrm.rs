use crate::domain::coordinates::Coordinates;
use crate::routing::{RouteSummary, RoutingError, RoutingProvider, TravelMode};
use serde::Deserialize;

/// OSRM-style HTTP routing provider. `/route` and `/table` follow the OSRM
/// v1 contract; geocoding goes through a Nominatim-compatible `/search`
/// endpoint on the same host.
pub struct OsrmProvider {
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

impl OsrmProvider {
    pub fn new(base_url: &str, api_key: &str, timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout_ms,
            client: reqwest::Client::new(),
        }
    }

    fn coord_segment(points: &[Coordinates]) -> String {
        points
            .iter()
            .map(|p| format!("{:.6},{:.6}", p.lng, p.lat))
            .collect::<Vec<_>>()
            .join(";")
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<T, RoutingError> {
        let mut req = self
            .client
            .get(url)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .query(query);
        if !self.api_key.is_empty() {
            req = req.query(&[("api_key", self.api_key.as_str())]);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                RoutingError::Timeout
            } else {
                RoutingError::Network(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RoutingError::Http(status.as_u16()));
        }
        resp.json::<T>()
            .await
            .map_err(|e| RoutingError::Decode(e.to_string()))
    }
}

#[derive(Deserialize)]
struct RouteResponse {
    code: String,
    routes: Option<Vec<RouteLeg>>,
}

#[derive(Deserialize)]
struct RouteLeg {
    distance: f64,
    duration: f64,
}

#[derive(Deserialize)]
struct TableResponse {
    code: String,
    distances: Option<Vec<Vec<Option<f64>>>>,
    durations: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

#[async_trait::async_trait]
impl RoutingProvider for OsrmProvider {
    fn name(&self) -> &'static str {
        "osrm"
    }

    async fn geocode(&self, address: &str) -> Result<Coordinates, RoutingError> {
        let url = format!("{}/search", self.base_url);
        let hits: Vec<SearchHit> = self
            .get_json(url, &[("q", address), ("format", "json"), ("limit", "1")])
            .await?;
        let hit = hits.into_iter().next().ok_or(RoutingError::NoResult)?;
        let lat = hit.lat.parse::<f64>().map_err(|e| RoutingError::Decode(e.to_string()))?;
        let lng = hit.lon.parse::<f64>().map_err(|e| RoutingError::Decode(e.to_string()))?;
        Coordinates::new(lat, lng).map_err(|_| RoutingError::Decode("coordinates out of range".to_string()))
    }

    async fn compute_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        mode: TravelMode,
    ) -> Result<RouteSummary, RoutingError> {
        let url = format!(
            "{}/route/v1/{}/{}?overview=false",
            self.base_url,
            mode.as_str(),
            Self::coord_segment(&[origin, destination]),
        );
        let parsed: RouteResponse = self.get_json(url, &[]).await?;
        if parsed.code != "Ok" {
            return Err(RoutingError::Provider(parsed.code));
        }
        let route = parsed
            .routes
            .and_then(|r| r.into_iter().next())
            .ok_or(RoutingError::NoResult)?;
        Ok(RouteSummary {
            distance_m: route.distance,
            duration_s: route.duration,
        })
    }

    async fn distance_matrix(
        &self,
        origins: &[Coordinates],
        destinations: &[Coordinates],
        mode: TravelMode,
    ) -> Result<Vec<Vec<Option<RouteSummary>>>, RoutingError> {
        if origins.is_empty() || destinations.is_empty() {
            return Ok(Vec::new());
        }

        let all: Vec<Coordinates> = origins.iter().chain(destinations.iter()).copied().collect();
        let sources: Vec<String> = (0..origins.len()).map(|i| i.to_string()).collect();
        let dests: Vec<String> = (origins.len()..all.len()).map(|i| i.to_string()).collect();
        let url = format!(
            "{}/table/v1/{}/{}?annotations=distance,duration&sources={}&destinations={}",
            self.base_url,
            mode.as_str(),
            Self::coord_segment(&all),
            sources.join(";"),
            dests.join(";"),
        );

        let parsed: TableResponse = self.get_json(url, &[]).await?;
        if parsed.code != "Ok" {
            return Err(RoutingError::Provider(parsed.code));
        }
        let distances = parsed.distances.ok_or(RoutingError::NoResult)?;
        let durations = parsed.durations.ok_or(RoutingError::NoResult)?;

        let mut out = Vec::with_capacity(origins.len());
        for (row_d, row_t) in distances.into_iter().zip(durations.into_iter()) {
            let row = row_d
                .into_iter()
                .zip(row_t.into_iter())
                .map(|(d, t)| match (d, t) {
                    (Some(distance_m), Some(duration_s)) => Some(RouteSummary {
                        distance_m,
                        duration_s,
                    }),
                    _ => None,
                })
                .collect();
            out.push(row);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_segment_is_lng_lat_ordered() {
        let a = Coordinates::new(-4.05, 39.66).unwrap();
        let b = Coordinates::new(-4.06, 39.67).unwrap();
        assert_eq!(
            OsrmProvider::coord_segment(&[a, b]),
            "39.660000,-4.050000;39.670000,-4.060000"
        );
    }

    #[test]
    fn search_query_is_encoded_by_the_client() {
        let req = reqwest::Client::new()
            .get("http://localhost/search")
            .query(&[("q", "Moi Avenue 12"), ("format", "json")])
            .build()
            .unwrap();
        assert_eq!(req.url().query(), Some("q=Moi+Avenue+12&format=json"));
    }
}
