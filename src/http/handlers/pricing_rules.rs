use crate::domain::pricing::SaveRuleRequest;
use crate::error::EngineError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

pub async fn list_rules(State(state): State<AppState>) -> Result<impl IntoResponse, EngineError> {
    let rules = state.rules_repo.list().await?;
    Ok(Json(rules))
}

pub async fn save_rule(
    State(state): State<AppState>,
    Json(req): Json<SaveRuleRequest>,
) -> Result<impl IntoResponse, EngineError> {
    let rule = state.rules_repo.save(req).await?;
    Ok(Json(rule))
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    if !state.rules_repo.delete(rule_id).await? {
        return Err(EngineError::not_found(format!("rule {rule_id}")));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
