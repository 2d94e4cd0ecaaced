//! Failure taxonomy of the inference pipeline.

use thiserror::Error;

/// Everything that can go wrong while serving a prediction.
///
/// Expected input variation is not in here: a too-short batch item is
/// represented as data ([`crate::engine::BatchOutcome::Rejected`]) and never
/// raised through this type. Only system and model malfunction propagates.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The artifact set never loaded successfully. Permanent until the
    /// process restarts; every prediction call fails identically.
    #[error("classifier artifacts are not available")]
    ServiceUnavailable,

    /// The batch exceeded the hard item limit. Nothing was processed.
    #[error("batch of {actual} texts exceeds the maximum of {limit}")]
    BatchTooLarge { actual: usize, limit: usize },

    /// Vectorization or scoring failed on a valid input. Fatal to the
    /// enclosing call or batch, with the underlying cause attached.
    #[error("inference failed")]
    Inference(#[from] anyhow::Error),
}
