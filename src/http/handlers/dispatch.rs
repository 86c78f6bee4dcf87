use crate::domain::coordinates::Coordinates;
use crate::domain::dispatch::{AssignmentOutcome, DispatchOptions};
use crate::error::EngineError;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct FindRiderRequest {
    pub delivery_lat: f64,
    pub delivery_lng: f64,
    #[serde(flatten)]
    pub options: DispatchOptions,
}

pub async fn find_optimal_rider(
    State(state): State<AppState>,
    Json(req): Json<FindRiderRequest>,
) -> Result<impl IntoResponse, EngineError> {
    let dropoff = Coordinates::new(req.delivery_lat, req.delivery_lng)?;
    let evaluation = state.dispatch_service.find_optimal_rider(dropoff, &req.options).await?;
    Ok(Json(evaluation))
}

pub async fn auto_assign(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
    options: Option<Json<DispatchOptions>>,
) -> Result<impl IntoResponse, EngineError> {
    let options = options.map(|Json(o)| o).unwrap_or_default();
    let outcome = state
        .dispatch_service
        .auto_assign_delivery(delivery_id, &options)
        .await?;
    let status = match &outcome {
        AssignmentOutcome::Assigned { .. } => axum::http::StatusCode::OK,
        AssignmentOutcome::AlreadyAssigned { .. } => axum::http::StatusCode::CONFLICT,
    };
    Ok((status, Json(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<i64>,
}

pub async fn dispatch_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, EngineError> {
    let days = query.days.unwrap_or(7).clamp(1, 365);
    let stats = state.dispatch_audit_repo.daily_stats(days).await?;
    Ok(Json(serde_json::json!({ "days": days, "daily": stats })))
}
