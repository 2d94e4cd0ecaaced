//! Core inference pipeline for the mindsift mental-health text classifier.
//!
//! Resolves and loads versioned classifier artifacts from disk, then turns
//! raw text into a category plus a calibrated confidence distribution.
//! Transport layers live elsewhere; this crate exposes plain function-call
//! contracts only.

pub mod artifact;
pub mod category;
pub mod engine;
pub mod error;
pub mod model;
pub mod vectorizer;

pub use artifact::{
    ArtifactProvider, ArtifactSet, DirArtifactProvider, LexicographicSelector, MODEL_PREFIX,
    VECTORIZER_PREFIX, VersionSelector,
};
pub use category::CATEGORIES;
pub use engine::{BatchOutcome, InferenceEngine, MAX_BATCH_SIZE, MIN_TEXT_LENGTH, Prediction};
pub use error::ClassifyError;
