use crate::domain::rider::RiderStatus;
use crate::error::EngineError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

pub async fn rider_availability(State(state): State<AppState>) -> Result<impl IntoResponse, EngineError> {
    let riders = state.riders_repo.list_with_workload().await?;
    Ok(Json(riders))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// Manual status transition, e.g. bringing a rider online at shift start.
pub async fn set_rider_status(
    State(state): State<AppState>,
    Path(rider_id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<impl IntoResponse, EngineError> {
    let status = RiderStatus::parse(&req.status)
        .ok_or_else(|| EngineError::validation("status", format!("unknown status '{}'", req.status)))?;
    if !state.riders_repo.set_status(rider_id, status).await? {
        return Err(EngineError::not_found(format!("rider {rider_id}")));
    }
    Ok(Json(serde_json::json!({ "rider_id": rider_id, "status": status })))
}
