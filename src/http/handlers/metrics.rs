use crate::error::EngineError;
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

const RECENT_SAMPLE: i64 = 20;

pub async fn pricing_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, EngineError> {
    let stats = state.pricing_audit_repo.stats().await?;
    let per_rule = state.pricing_audit_repo.rule_usage().await?;
    let recent = state.pricing_audit_repo.recent(RECENT_SAMPLE).await?;
    let cache_entries = state.cache.len().await;

    Ok(Json(serde_json::json!({
        "totals": stats,
        "per_rule": per_rule,
        "recent": recent,
        "cache_entries": cache_entries,
    })))
}

pub async fn purge_cache(State(state): State<AppState>) -> Result<impl IntoResponse, EngineError> {
    let purged = state.cache.purge().await;
    tracing::info!(purged, "distance cache purged");
    Ok(Json(serde_json::json!({ "purged_entries": purged })))
}
