use crate::domain::coordinates::Coordinates;
use crate::domain::pricing::{FeeQuote, OrderContext};
use crate::error::EngineError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CalculateFeeRequest {
    pub origin_lat: f64,
    pub origin_lng: f64,
    pub delivery_lat: f64,
    pub delivery_lng: f64,
    #[serde(default)]
    pub order_context: OrderContext,
}

pub async fn calculate_fee(
    State(state): State<AppState>,
    Json(req): Json<CalculateFeeRequest>,
) -> Result<Json<FeeQuote>, EngineError> {
    let origin = Coordinates::new(req.origin_lat, req.origin_lng)?;
    let destination = Coordinates::new(req.delivery_lat, req.delivery_lng)?;
    let quote = state
        .fee_service
        .calculate_fee(origin, destination, req.order_context)
        .await?;
    Ok(Json(quote))
}

pub async fn attach_audit_to_order(
    State(state): State<AppState>,
    Path((audit_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, EngineError> {
    state.fee_service.attach_audit_to_order(audit_id, order_id).await?;
    Ok(Json(serde_json::json!({ "attached": true })))
}

pub async fn health() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ok")
}
