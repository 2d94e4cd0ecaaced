use std::sync::Arc;

use mindsift_core::{ArtifactProvider, InferenceEngine};

pub type AppState = Arc<State>;

/// Shared per-process state handed to every route handler.
pub struct State {
    pub engine: InferenceEngine,
    pub version: &'static str,
}

impl State {
    pub fn new(provider: Arc<dyn ArtifactProvider>) -> Self {
        Self {
            engine: InferenceEngine::new(provider),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
