use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mindsift API",
        version = "1.0.0",
        description = "Mental-health text classification: five categories with softmax-normalized confidence scores from a pre-trained linear model.",
        license(name = "MIT")
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "categories", description = "Classifier category set"),
        (name = "predict", description = "Single and batch classification"),
        (name = "stats", description = "Loaded model information")
    ),
    paths(
        crate::routes::health::health,
        crate::routes::categories::get_categories,
        crate::routes::predict::predict,
        crate::routes::predict::batch_predict,
        crate::routes::stats::get_stats,
    ),
    components(schemas(
        crate::routes::health::HealthResponse,
        crate::routes::categories::CategoriesResponse,
        crate::routes::predict::TextInput,
        crate::routes::predict::BatchTextInput,
        crate::routes::predict::PredictionResponse,
        crate::routes::stats::StatsResponse,
    ))
)]
pub struct ApiDoc;
