use std::sync::Arc;

use mindsift_api::{construct_router, state::State};
use mindsift_core::{ArtifactProvider, DirArtifactProvider};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Mindsift API Service");

    let config = config::Config::from_env()?;

    let provider = Arc::new(DirArtifactProvider::new(&config.models_dir));
    match provider.get() {
        Some(artifacts) => {
            tracing::info!(version = %artifacts.version(), "classifier artifacts loaded");
        }
        None => {
            tracing::warn!(
                dir = %config.models_dir.display(),
                "classifier artifacts not available; prediction endpoints will return 503"
            );
        }
    }

    let state = Arc::new(State::new(provider));
    let app = construct_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
