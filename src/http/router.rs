use crate::http::handlers::{dispatch, fees, metrics, pricing_rules, riders};
use crate::http::middleware::admin_auth::require_internal_api_key;
use crate::AppState;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;

/// Full route table. Mutating pricing/rider surfaces sit behind the internal
/// api key; everything else is open to in-cluster callers.
pub fn build(state: AppState, internal_api_key: String) -> Router {
    let admin = Router::new()
        .route("/pricing/rules", put(pricing_rules::save_rule))
        .route("/pricing/rules/:rule_id", delete(pricing_rules::delete_rule))
        .route("/pricing/cache/purge", post(metrics::purge_cache))
        .route(
            "/pricing/audits/:audit_id/attach/:order_id",
            post(fees::attach_audit_to_order),
        )
        .route("/riders/:rider_id/status", patch(riders::set_rider_status))
        .layer(from_fn_with_state(internal_api_key, require_internal_api_key));

    Router::new()
        .route("/health", get(fees::health))
        .route("/fees/calculate", post(fees::calculate_fee))
        .route("/dispatch/find-rider", post(dispatch::find_optimal_rider))
        .route("/dispatch/assign/:delivery_id", post(dispatch::auto_assign))
        .route("/dispatch/analytics", get(dispatch::dispatch_analytics))
        .route("/riders/availability", get(riders::rider_availability))
        .route("/pricing/rules", get(pricing_rules::list_rules))
        .route("/pricing/metrics", get(metrics::pricing_metrics))
        .merge(admin)
        .with_state(state)
}
