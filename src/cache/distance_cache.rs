use crate::domain::coordinates::Coordinates;
use crate::routing::{RouteSummary, RoutingProvider, TravelMode};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    origin: (i64, i64),
    destination: (i64, i64),
    mode: &'static str,
}

#[derive(Debug, Clone)]
struct CachedRoute {
    summary: RouteSummary,
    provider: String,
    fallback: bool,
    stored_at: Instant,
    ttl: Duration,
}

impl CachedRoute {
    fn fresh(&self) -> bool {
        self.stored_at.elapsed() <= self.ttl
    }
}

/// Resolved distance with its provenance flags.
#[derive(Debug, Clone)]
pub struct RouteLookup {
    pub distance_m: f64,
    pub duration_s: f64,
    pub provider: String,
    pub cache_hit: bool,
    pub fallback_used: bool,
}

/// Memoizes routing-provider lookups keyed by rounded coordinate pairs.
/// Fallback results get a short TTL so the cache self-heals once the
/// provider recovers. Races on simultaneous misses are benign: both callers
/// hit the provider and the last write wins.
#[derive(Clone)]
pub struct DistanceCache {
    provider: Arc<dyn RoutingProvider>,
    entries: Arc<RwLock<HashMap<CacheKey, CachedRoute>>>,
    ttl: Duration,
    fallback_ttl: Duration,
    fallback_multiplier: f64,
    precision: u32,
}

impl DistanceCache {
    pub fn new(
        provider: Arc<dyn RoutingProvider>,
        ttl: Duration,
        fallback_ttl: Duration,
        fallback_multiplier: f64,
        precision: u32,
    ) -> Self {
        Self {
            provider,
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            fallback_ttl,
            fallback_multiplier,
            precision,
        }
    }

    fn key(&self, origin: Coordinates, destination: Coordinates, mode: TravelMode) -> CacheKey {
        CacheKey {
            origin: origin.rounded(self.precision),
            destination: destination.rounded(self.precision),
            mode: mode.as_str(),
        }
    }

    fn estimate(&self, origin: Coordinates, destination: Coordinates) -> RouteSummary {
        let distance_m = origin.haversine_km(&destination) * self.fallback_multiplier * 1000.0;
        // Assume 30 km/h average road speed for the degraded duration figure.
        let duration_s = distance_m / 1000.0 / 30.0 * 3600.0;
        RouteSummary {
            distance_m,
            duration_s,
        }
    }

    pub async fn get_or_compute(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        mode: TravelMode,
    ) -> RouteLookup {
        let key = self.key(origin, destination, mode);
        {
            let read = self.entries.read().await;
            if let Some(cached) = read.get(&key) {
                if cached.fresh() {
                    return RouteLookup {
                        distance_m: cached.summary.distance_m,
                        duration_s: cached.summary.duration_s,
                        provider: cached.provider.clone(),
                        cache_hit: true,
                        fallback_used: cached.fallback,
                    };
                }
            }
        }

        match self.provider.compute_route(origin, destination, mode).await {
            Ok(summary) => {
                self.store(key, summary, self.provider.name().to_string(), false).await;
                RouteLookup {
                    distance_m: summary.distance_m,
                    duration_s: summary.duration_s,
                    provider: self.provider.name().to_string(),
                    cache_hit: false,
                    fallback_used: false,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "routing provider failed, using great-circle fallback");
                let summary = self.estimate(origin, destination);
                self.store(key, summary, "great_circle".to_string(), true).await;
                RouteLookup {
                    distance_m: summary.distance_m,
                    duration_s: summary.duration_s,
                    provider: "great_circle".to_string(),
                    cache_hit: false,
                    fallback_used: true,
                }
            }
        }
    }

    /// Resolve several origins against one destination, issuing a single
    /// matrix call for the cache misses. Unroutable pairs and whole-call
    /// failures degrade per pair to the great-circle estimate.
    pub async fn get_or_compute_many(
        &self,
        origins: &[Coordinates],
        destination: Coordinates,
        mode: TravelMode,
    ) -> Vec<RouteLookup> {
        let mut out: Vec<Option<RouteLookup>> = vec![None; origins.len()];
        let mut miss_idx: Vec<usize> = Vec::new();

        {
            let read = self.entries.read().await;
            for (i, origin) in origins.iter().enumerate() {
                let key = self.key(*origin, destination, mode);
                match read.get(&key) {
                    Some(cached) if cached.fresh() => {
                        out[i] = Some(RouteLookup {
                            distance_m: cached.summary.distance_m,
                            duration_s: cached.summary.duration_s,
                            provider: cached.provider.clone(),
                            cache_hit: true,
                            fallback_used: cached.fallback,
                        });
                    }
                    _ => miss_idx.push(i),
                }
            }
        }

        if miss_idx.is_empty() {
            return self.collect_lookups(out, origins, destination);
        }

        let miss_origins: Vec<Coordinates> = miss_idx.iter().map(|&i| origins[i]).collect();
        let matrix = self
            .provider
            .distance_matrix(&miss_origins, &[destination], mode)
            .await;

        match matrix {
            Ok(rows) => {
                for (slot, &i) in miss_idx.iter().enumerate() {
                    let cell = rows.get(slot).and_then(|row| row.first().copied()).flatten();
                    let key = self.key(origins[i], destination, mode);
                    let lookup = match cell {
                        Some(summary) => {
                            self.store(key, summary, self.provider.name().to_string(), false).await;
                            RouteLookup {
                                distance_m: summary.distance_m,
                                duration_s: summary.duration_s,
                                provider: self.provider.name().to_string(),
                                cache_hit: false,
                                fallback_used: false,
                            }
                        }
                        None => self.fallback_lookup(key, origins[i], destination).await,
                    };
                    out[i] = Some(lookup);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "distance matrix failed, using great-circle fallback for all misses");
                for &i in &miss_idx {
                    let key = self.key(origins[i], destination, mode);
                    out[i] = Some(self.fallback_lookup(key, origins[i], destination).await);
                }
            }
        }

        self.collect_lookups(out, origins, destination)
    }

    /// Every slot is filled by this point; an empty one falls back to an
    /// uncached estimate.
    fn collect_lookups(
        &self,
        slots: Vec<Option<RouteLookup>>,
        origins: &[Coordinates],
        destination: Coordinates,
    ) -> Vec<RouteLookup> {
        slots
            .into_iter()
            .zip(origins.iter())
            .map(|(slot, origin)| match slot {
                Some(lookup) => lookup,
                None => {
                    let summary = self.estimate(*origin, destination);
                    RouteLookup {
                        distance_m: summary.distance_m,
                        duration_s: summary.duration_s,
                        provider: "great_circle".to_string(),
                        cache_hit: false,
                        fallback_used: true,
                    }
                }
            })
            .collect()
    }

    async fn fallback_lookup(
        &self,
        key: CacheKey,
        origin: Coordinates,
        destination: Coordinates,
    ) -> RouteLookup {
        let summary = self.estimate(origin, destination);
        self.store(key, summary, "great_circle".to_string(), true).await;
        RouteLookup {
            distance_m: summary.distance_m,
            duration_s: summary.duration_s,
            provider: "great_circle".to_string(),
            cache_hit: false,
            fallback_used: true,
        }
    }

    async fn store(&self, key: CacheKey, summary: RouteSummary, provider: String, fallback: bool) {
        let ttl = if fallback { self.fallback_ttl } else { self.ttl };
        if ttl.is_zero() {
            return;
        }
        let mut write = self.entries.write().await;
        write.insert(
            key,
            CachedRoute {
                summary,
                provider,
                fallback,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    pub async fn purge(&self) -> usize {
        let mut write = self.entries.write().await;
        let purged = write.len();
        write.clear();
        purged
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl std::fmt::Debug for DistanceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceCache")
            .field("ttl", &self.ttl)
            .field("fallback_ttl", &self.fallback_ttl)
            .field("precision", &self.precision)
            .finish()
    }
}
