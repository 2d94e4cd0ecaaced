use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::{AppState, State};

pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

pub use axum;

pub fn construct_router(state: Arc<State>) -> Router {
    Router::new()
        .route("/", get(service_info))
        .nest("/health", routes::health::routes())
        .nest("/categories", routes::categories::routes())
        .nest("/stats", routes::stats::routes())
        .merge(routes::predict::routes())
        .with_state(state)
        .merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
}

#[tracing::instrument(name = "GET /", skip(state))]
async fn service_info(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<Value> {
    Json(json!({
        "message": "Mental Health Text Classifier API",
        "version": state.version,
        "endpoints": {
            "health": "/health",
            "predict": "/predict (POST)",
            "batch_predict": "/batch-predict (POST)",
            "categories": "/categories",
            "stats": "/stats",
            "docs": "/docs"
        }
    }))
}
