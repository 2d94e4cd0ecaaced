use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::{Router, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(health))
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` when the artifact set is loaded, `model_not_loaded` otherwise.
    pub status: String,
    pub model_loaded: bool,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health and artifact status", body = HealthResponse)
    )
)]
#[tracing::instrument(name = "GET /health", skip(state))]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.engine.artifacts().is_some();
    Json(HealthResponse {
        status: if model_loaded {
            "healthy".to_string()
        } else {
            "model_not_loaded".to_string()
        },
        model_loaded,
        version: state.version.to_string(),
        timestamp: Utc::now(),
    })
}
