use dispatch_engine::cache::distance_cache::DistanceCache;
use dispatch_engine::config::AppConfig;
use dispatch_engine::repo::deliveries_repo::DeliveriesRepo;
use dispatch_engine::repo::dispatch_audit_repo::DispatchAuditRepo;
use dispatch_engine::repo::pricing_audit_repo::PricingAuditRepo;
use dispatch_engine::repo::pricing_rules_repo::PricingRulesRepo;
use dispatch_engine::repo::riders_repo::RidersRepo;
use dispatch_engine::routing::osrm::OsrmProvider;
use dispatch_engine::service::dispatch_service::DispatchService;
use dispatch_engine::service::fee_service::FeeService;
use dispatch_engine::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let provider = Arc::new(OsrmProvider::new(
        &cfg.routing_base_url,
        &cfg.routing_api_key,
        cfg.settings.provider_timeout_ms,
    ));
    let cache = DistanceCache::new(
        provider,
        Duration::from_secs(cfg.settings.cache_ttl_seconds),
        Duration::from_secs(cfg.settings.fallback_cache_ttl_seconds),
        cfg.settings.fallback_multiplier,
        cfg.settings.coordinate_precision,
    );

    let rules_repo = PricingRulesRepo { pool: pool.clone() };
    let riders_repo = RidersRepo { pool: pool.clone() };
    let deliveries_repo = DeliveriesRepo { pool: pool.clone() };
    let pricing_audit_repo = PricingAuditRepo { pool: pool.clone() };
    let dispatch_audit_repo = DispatchAuditRepo { pool: pool.clone() };

    let fee_service = FeeService {
        rules_repo: rules_repo.clone(),
        audit_repo: pricing_audit_repo.clone(),
        cache: cache.clone(),
        settings: cfg.settings.clone(),
    };
    let dispatch_service = DispatchService {
        pool: pool.clone(),
        riders_repo: riders_repo.clone(),
        deliveries_repo,
        audit_repo: dispatch_audit_repo.clone(),
        cache: cache.clone(),
        settings: cfg.settings.clone(),
    };

    let state = AppState {
        fee_service,
        dispatch_service,
        rules_repo,
        riders_repo,
        pricing_audit_repo,
        dispatch_audit_repo,
        cache,
    };

    let app = dispatch_engine::http::router::build(state, cfg.internal_api_key.clone());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
