use std::collections::HashMap;

use axum::extract::State;
use axum::{Json, Router, routing::post};
use chrono::{DateTime, Utc};
use mindsift_core::{BatchOutcome, MIN_TEXT_LENGTH, Prediction};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict))
        .route("/batch-predict", post(batch_predict))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TextInput {
    /// Text to classify, minimum 10 characters.
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BatchTextInput {
    /// Texts to classify, at most 100 per call.
    pub texts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    /// Predicted category, or the sentinel `ERROR` for rejected batch items.
    pub predicted_class: String,
    /// Category index, `-1` for rejected batch items.
    pub class_number: i64,
    /// Per-category confidence; empty for rejected batch items.
    pub confidence_scores: HashMap<String, f64>,
    pub timestamp: DateTime<Utc>,
    pub text_length: usize,
}

impl From<Prediction> for PredictionResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            predicted_class: prediction.category,
            class_number: prediction.class_index as i64,
            confidence_scores: prediction.confidence_scores,
            timestamp: prediction.timestamp,
            text_length: prediction.text_length,
        }
    }
}

impl From<BatchOutcome> for PredictionResponse {
    fn from(outcome: BatchOutcome) -> Self {
        match outcome {
            BatchOutcome::Predicted(prediction) => prediction.into(),
            BatchOutcome::Rejected { text_length } => Self {
                predicted_class: "ERROR".to_string(),
                class_number: -1,
                confidence_scores: HashMap::new(),
                timestamp: Utc::now(),
                text_length,
            },
        }
    }
}

#[utoipa::path(
    post,
    path = "/predict",
    tag = "predict",
    request_body = TextInput,
    responses(
        (status = 200, description = "Prediction with confidence distribution", body = PredictionResponse),
        (status = 400, description = "Text shorter than 10 characters"),
        (status = 503, description = "Classifier artifacts not loaded")
    )
)]
#[tracing::instrument(name = "POST /predict", skip(state, input))]
pub async fn predict(
    State(state): State<AppState>,
    Json(input): Json<TextInput>,
) -> Result<Json<PredictionResponse>, ApiError> {
    // minimum-length validation lives here; the engine trusts it on the
    // single-item path
    if input.text.chars().count() < MIN_TEXT_LENGTH {
        return Err(ApiError::bad_request(format!(
            "text must be at least {MIN_TEXT_LENGTH} characters"
        )));
    }

    let prediction = state.engine.predict_one(&input.text)?;
    Ok(Json(prediction.into()))
}

#[utoipa::path(
    post,
    path = "/batch-predict",
    tag = "predict",
    request_body = BatchTextInput,
    responses(
        (status = 200, description = "One outcome per input text, order preserved", body = Vec<PredictionResponse>),
        (status = 400, description = "Empty batch or more than 100 texts"),
        (status = 503, description = "Classifier artifacts not loaded")
    )
)]
#[tracing::instrument(name = "POST /batch-predict", skip(state, input), fields(batch_size = input.texts.len()))]
pub async fn batch_predict(
    State(state): State<AppState>,
    Json(input): Json<BatchTextInput>,
) -> Result<Json<Vec<PredictionResponse>>, ApiError> {
    if input.texts.is_empty() {
        return Err(ApiError::bad_request("texts must not be empty"));
    }

    let outcomes = state.engine.predict_batch(&input.texts)?;
    Ok(Json(outcomes.into_iter().map(Into::into).collect()))
}
