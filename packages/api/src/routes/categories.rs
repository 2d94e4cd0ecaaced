use std::collections::HashMap;

use axum::Json;
use axum::{Router, routing::get};
use mindsift_core::CATEGORIES;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(get_categories))
}

/// Short description shown next to each category.
const DESCRIPTIONS: [(&str, &str); 5] = [
    ("Stress", "Work, academic, or life pressure related stress"),
    (
        "Depression",
        "Persistent sadness, hopelessness, and loss of interest",
    ),
    ("Bipolar", "Extreme mood swings between highs and lows"),
    (
        "Personality",
        "Identity struggles and relationship difficulties",
    ),
    ("Anxiety", "Excessive worry, panic, and fear"),
];

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
    pub count: usize,
    pub descriptions: HashMap<String, String>,
}

#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    responses(
        (status = 200, description = "All categories the classifier can assign", body = CategoriesResponse)
    )
)]
#[tracing::instrument(name = "GET /categories")]
pub async fn get_categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: CATEGORIES.iter().map(ToString::to_string).collect(),
        count: CATEGORIES.len(),
        descriptions: DESCRIPTIONS
            .iter()
            .map(|(name, description)| (name.to_string(), description.to_string()))
            .collect(),
    })
}
