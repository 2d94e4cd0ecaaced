//! The inference engine: validated text in, calibrated distribution out.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::Serialize;

use crate::artifact::{ArtifactProvider, ArtifactSet};
use crate::category::{self, CATEGORIES};
use crate::error::ClassifyError;

/// Hard cap on the number of texts a single batch call may carry.
pub const MAX_BATCH_SIZE: usize = 100;

/// Minimum character count for a classifiable text.
pub const MIN_TEXT_LENGTH: usize = 10;

/// A single classification outcome.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// Predicted category name, taken from the model's native prediction.
    pub category: String,
    /// Index of the predicted category in the category set.
    pub class_index: usize,
    /// Softmax-normalized confidence per category. Non-negative, sums to 1.
    pub confidence_scores: HashMap<String, f64>,
    /// Character count of the classified text.
    pub text_length: usize,
    /// When this prediction was generated.
    pub timestamp: DateTime<Utc>,
}

/// Per-item result of a batch call.
///
/// A too-short input is data, not a failure: it becomes `Rejected` and the
/// batch keeps going. Engine malfunction on a valid item aborts the whole
/// batch through [`ClassifyError::Inference`] instead.
#[derive(Debug, Clone, Serialize)]
pub enum BatchOutcome {
    Predicted(Prediction),
    Rejected { text_length: usize },
}

/// Stateless prediction front-end over an injected artifact provider.
///
/// Every call re-reads the provider's cached artifact set; the engine itself
/// holds no mutable state and is safe to share across request handlers.
pub struct InferenceEngine {
    provider: Arc<dyn ArtifactProvider>,
}

impl InferenceEngine {
    pub fn new(provider: Arc<dyn ArtifactProvider>) -> Self {
        Self { provider }
    }

    /// The currently loaded artifact set, if any.
    pub fn artifacts(&self) -> Option<Arc<ArtifactSet>> {
        self.provider.get()
    }

    /// Classify one text.
    ///
    /// The minimum-length rule is the caller's responsibility on this path;
    /// the engine trusts that it was already enforced.
    pub fn predict_one(&self, text: &str) -> Result<Prediction, ClassifyError> {
        let artifacts = self
            .provider
            .get()
            .ok_or(ClassifyError::ServiceUnavailable)?;
        self.predict_with(&artifacts, text)
    }

    /// Classify up to [`MAX_BATCH_SIZE`] texts, preserving order and length.
    ///
    /// Items shorter than [`MIN_TEXT_LENGTH`] characters are rejected
    /// individually without aborting the rest of the batch.
    pub fn predict_batch(&self, texts: &[String]) -> Result<Vec<BatchOutcome>, ClassifyError> {
        let artifacts = self
            .provider
            .get()
            .ok_or(ClassifyError::ServiceUnavailable)?;

        if texts.len() > MAX_BATCH_SIZE {
            return Err(ClassifyError::BatchTooLarge {
                actual: texts.len(),
                limit: MAX_BATCH_SIZE,
            });
        }

        let mut outcomes = Vec::with_capacity(texts.len());
        for text in texts {
            let text_length = text.chars().count();
            if text_length < MIN_TEXT_LENGTH {
                outcomes.push(BatchOutcome::Rejected { text_length });
                continue;
            }
            outcomes.push(BatchOutcome::Predicted(
                self.predict_with(&artifacts, text)?,
            ));
        }
        Ok(outcomes)
    }

    fn predict_with(
        &self,
        artifacts: &ArtifactSet,
        text: &str,
    ) -> Result<Prediction, ClassifyError> {
        let features = artifacts.vectorizer().transform(text)?;

        // The model's own prediction is the contract of record for the label;
        // the raw scores only feed confidence normalization.
        let class_index = artifacts.model().predict(&features)?;
        let scores = artifacts.model().decision_scores(&features)?;
        let confidences = softmax(&scores);

        let category = category::name_of(class_index).ok_or_else(|| {
            ClassifyError::Inference(anyhow!(
                "model predicted out-of-range class index {class_index}"
            ))
        })?;

        let confidence_scores = CATEGORIES
            .iter()
            .zip(confidences.iter())
            .map(|(name, confidence)| (name.to_string(), *confidence))
            .collect();

        Ok(Prediction {
            category: category.to_string(),
            class_index,
            confidence_scores,
            text_length: text.chars().count(),
            timestamp: Utc::now(),
        })
    }
}

/// Numerically stable softmax.
///
/// Shifts every score by the vector maximum before exponentiating, so
/// large-magnitude scores cannot overflow, then divides by the sum of
/// exponentials. The output is non-negative and sums to 1.
pub fn softmax(scores: &Array1<f64>) -> Array1<f64> {
    if scores.is_empty() {
        return Array1::zeros(0);
    }
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp = scores.mapv(|score| (score - max).exp());
    let sum = exp.sum();
    exp / sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactSet;
    use crate::model::DecisionModel;
    use crate::vectorizer::TextVectorizer;
    use anyhow::{Result, anyhow, bail};
    use ndarray::array;

    // ============================================================================
    // Test doubles
    // ============================================================================

    /// Five fixed features: presence of one marker word per category.
    struct MarkerVectorizer;

    const MARKERS: [&str; 5] = ["pressure", "hopeless", "swings", "identity", "anxious"];

    impl TextVectorizer for MarkerVectorizer {
        fn transform(&self, text: &str) -> Result<Array1<f64>> {
            if text.contains("poison") {
                bail!("vectorizer choked");
            }
            let lowered = text.to_lowercase();
            Ok(Array1::from_iter(MARKERS.iter().map(|marker| {
                if lowered.contains(marker) { 1.0 } else { 0.0 }
            })))
        }

        fn n_features(&self) -> usize {
            MARKERS.len()
        }
    }

    /// Linear scoring with an optional fixed native prediction, so the
    /// native-label-vs-argmax split stays testable.
    struct StubModel {
        forced_prediction: Option<usize>,
    }

    impl DecisionModel for StubModel {
        fn predict(&self, features: &Array1<f64>) -> Result<usize> {
            if let Some(index) = self.forced_prediction {
                return Ok(index);
            }
            let scores = self.decision_scores(features)?;
            scores
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(index, _)| index)
                .ok_or_else(|| anyhow!("empty scores"))
        }

        fn decision_scores(&self, features: &Array1<f64>) -> Result<Array1<f64>> {
            Ok(features.mapv(|f| f * 2.0 - 0.5))
        }

        fn n_classes(&self) -> usize {
            5
        }

        fn n_features(&self) -> usize {
            5
        }
    }

    struct StaticProvider(Option<Arc<ArtifactSet>>);

    impl ArtifactProvider for StaticProvider {
        fn get(&self) -> Option<Arc<ArtifactSet>> {
            self.0.clone()
        }
    }

    fn engine() -> InferenceEngine {
        engine_with_model(StubModel {
            forced_prediction: None,
        })
    }

    fn engine_with_model(model: StubModel) -> InferenceEngine {
        let set =
            ArtifactSet::new("test", Box::new(MarkerVectorizer), Box::new(model)).unwrap();
        InferenceEngine::new(Arc::new(StaticProvider(Some(Arc::new(set)))))
    }

    fn unavailable_engine() -> InferenceEngine {
        InferenceEngine::new(Arc::new(StaticProvider(None)))
    }

    // ============================================================================
    // Softmax properties
    // ============================================================================

    #[test]
    fn test_softmax_sums_to_one_across_magnitudes() {
        for scale in [1.0, 100.0, 1e6] {
            let scores = array![0.1, -0.3, 0.7, 0.2, -0.9].mapv(|s| s * scale);
            let out = softmax(&scores);
            assert!(out.iter().all(|&p| p >= 0.0), "scale {scale}");
            assert!((out.sum() - 1.0).abs() < 1e-6, "scale {scale}");
        }
    }

    #[test]
    fn test_softmax_is_shift_invariant() {
        let scores = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let shifted = scores.mapv(|s| s + 1234.5);
        let a = softmax(&scores);
        let b = softmax(&shifted);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_softmax_does_not_overflow_on_huge_scores() {
        let out = softmax(&array![1e300, 1e300, 0.0]);
        assert!(out.iter().all(|p| p.is_finite()));
        assert!((out.sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_of_empty_vector_is_empty() {
        assert_eq!(softmax(&Array1::zeros(0)).len(), 0);
    }

    // ============================================================================
    // Single-item prediction
    // ============================================================================

    #[test]
    fn test_predict_one_unavailable() {
        let result = unavailable_engine().predict_one("long enough text about anything");
        assert!(matches!(result, Err(ClassifyError::ServiceUnavailable)));
    }

    #[test]
    fn test_predict_one_anxiety_scenario() {
        let engine = engine();
        let text =
            "I feel extremely anxious about everything, my heart races and I can't stop worrying";
        let prediction = engine.predict_one(text).unwrap();

        assert_eq!(prediction.category, "Anxiety");
        assert_eq!(prediction.class_index, 4);
        assert_eq!(prediction.text_length, text.chars().count());
        assert_eq!(prediction.confidence_scores.len(), CATEGORIES.len());

        let total: f64 = prediction.confidence_scores.values().sum();
        assert!((total - 1.0).abs() < 1e-6);

        // the predicted category carries the highest confidence here
        let top = prediction
            .confidence_scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert_eq!(top.0, "Anxiety");
    }

    #[test]
    fn test_predict_one_is_deterministic() {
        let engine = engine();
        let text = "constant pressure at work is wearing me down";
        let a = engine.predict_one(text).unwrap();
        let b = engine.predict_one(text).unwrap();

        assert_eq!(a.category, b.category);
        assert_eq!(a.class_index, b.class_index);
        assert_eq!(a.confidence_scores, b.confidence_scores);
        assert_eq!(a.text_length, b.text_length);
    }

    #[test]
    fn test_predict_one_does_not_enforce_length() {
        // the single-item minimum-length rule belongs to the caller
        let prediction = engine().predict_one("anxious").unwrap();
        assert_eq!(prediction.text_length, 7);
    }

    #[test]
    fn test_predict_one_surfaces_inference_failure() {
        let result = engine().predict_one("this text is pure poison for the vectorizer");
        assert!(matches!(result, Err(ClassifyError::Inference(_))));
    }

    #[test]
    fn test_native_prediction_is_authoritative() {
        // native label disagrees with the score argmax on purpose
        let engine = engine_with_model(StubModel {
            forced_prediction: Some(1),
        });
        let prediction = engine
            .predict_one("anxious enough for a clear argmax elsewhere")
            .unwrap();

        assert_eq!(prediction.category, "Depression");
        assert_eq!(prediction.class_index, 1);

        // the distribution still reflects the raw scores, not the label
        let argmax = prediction
            .confidence_scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert_eq!(argmax.0, "Anxiety");
    }

    // ============================================================================
    // Batch prediction
    // ============================================================================

    #[test]
    fn test_predict_batch_unavailable() {
        let texts = vec!["long enough text about anything".to_string()];
        let result = unavailable_engine().predict_batch(&texts);
        assert!(matches!(result, Err(ClassifyError::ServiceUnavailable)));
    }

    #[test]
    fn test_predict_batch_too_large() {
        let texts = vec!["repeated test input".to_string(); MAX_BATCH_SIZE + 1];
        let result = engine().predict_batch(&texts);
        assert!(matches!(
            result,
            Err(ClassifyError::BatchTooLarge {
                actual: 101,
                limit: 100,
            })
        ));
    }

    #[test]
    fn test_predict_batch_at_limit_is_accepted() {
        let texts = vec!["anxious about the upcoming deadline".to_string(); MAX_BATCH_SIZE];
        let outcomes = engine().predict_batch(&texts).unwrap();
        assert_eq!(outcomes.len(), MAX_BATCH_SIZE);
    }

    #[test]
    fn test_predict_batch_preserves_order_and_length() {
        let texts = vec![
            "too short".to_string(),
            "I feel so sad and hopeless, nothing makes me happy anymore".to_string(),
            "x".to_string(),
        ];
        let outcomes = engine().predict_batch(&texts).unwrap();
        assert_eq!(outcomes.len(), 3);

        match &outcomes[0] {
            BatchOutcome::Rejected { text_length } => assert_eq!(*text_length, 9),
            other => panic!("expected rejection, got {other:?}"),
        }
        match &outcomes[1] {
            BatchOutcome::Predicted(prediction) => {
                assert_eq!(prediction.category, "Depression");
            }
            other => panic!("expected prediction, got {other:?}"),
        }
        match &outcomes[2] {
            BatchOutcome::Rejected { text_length } => assert_eq!(*text_length, 1),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_predict_batch_rejects_exactly_below_minimum() {
        let texts = vec![
            "123456789".to_string(),  // 9 chars
            "1234567890".to_string(), // 10 chars
        ];
        let outcomes = engine().predict_batch(&texts).unwrap();
        assert!(matches!(outcomes[0], BatchOutcome::Rejected { .. }));
        assert!(matches!(outcomes[1], BatchOutcome::Predicted(_)));
    }

    #[test]
    fn test_predict_batch_empty_input() {
        let outcomes = engine().predict_batch(&[]).unwrap();
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_predict_batch_engine_failure_aborts_batch() {
        // a too-short item is tolerated, an internal failure is not
        let texts = vec![
            "anxious about many upcoming things".to_string(),
            "poison that breaks the vectorizer".to_string(),
            "never reached but long enough".to_string(),
        ];
        let result = engine().predict_batch(&texts);
        assert!(matches!(result, Err(ClassifyError::Inference(_))));
    }
}
