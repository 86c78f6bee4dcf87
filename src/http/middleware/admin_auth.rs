use crate::error::{ErrorEnvelope, ErrorPayload};
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Guards rule management and cache administration. Full session auth lives
/// upstream; this service only checks the shared internal key.
pub async fn require_internal_api_key(
    State(expected): State<String>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get("X-Internal-Api-Key")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    if provided != expected {
        let body = ErrorEnvelope {
            error: ErrorPayload {
                code: "UNAUTHORIZED".to_string(),
                message: "missing or invalid internal api key".to_string(),
                details: None,
            },
        };
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    next.run(request).await
}
