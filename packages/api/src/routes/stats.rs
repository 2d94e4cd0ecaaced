use axum::Json;
use axum::extract::State;
use axum::{Router, routing::get};
use mindsift_core::CATEGORIES;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(get_stats))
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub model_type: String,
    /// Version identifier of the loaded artifact set.
    pub model_version: String,
    pub num_categories: usize,
    pub categories: Vec<String>,
    /// Dimensionality of the feature space.
    pub n_features: usize,
    pub model_status: String,
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Information about the loaded model", body = StatsResponse),
        (status = 503, description = "Classifier artifacts not loaded")
    )
)]
#[tracing::instrument(name = "GET /stats", skip(state))]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let artifacts = state
        .engine
        .artifacts()
        .ok_or_else(|| ApiError::service_unavailable("classifier artifacts are not available"))?;

    Ok(Json(StatsResponse {
        model_type: "Linear SVM (one-vs-rest) over TF-IDF features".to_string(),
        model_version: artifacts.version().to_string(),
        num_categories: artifacts.model().n_classes(),
        categories: CATEGORIES.iter().map(ToString::to_string).collect(),
        n_features: artifacts.model().n_features(),
        model_status: "loaded".to_string(),
    }))
}
