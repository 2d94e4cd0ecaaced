//! The multi-class decision function behind the classifier.

use anyhow::{Result, anyhow};
use ndarray::{Array1, Array2};
use serde::Deserialize;

/// Multi-class decision function over vectorized text.
///
/// `predict` is the model's native label call and is the contract of record
/// for the predicted class. `decision_scores` exposes the raw per-class
/// scores that feed confidence normalization. The two stay separate so a
/// model with a non-argmax decision rule remains expressible.
pub trait DecisionModel: Send + Sync {
    /// The model's own predicted class index for the given features.
    fn predict(&self, features: &Array1<f64>) -> Result<usize>;

    /// Uncalibrated per-class scores, ordered per the category set.
    fn decision_scores(&self, features: &Array1<f64>) -> Result<Array1<f64>>;

    fn n_classes(&self) -> usize;

    fn n_features(&self) -> usize;
}

/// Linear one-vs-rest classifier: `w_c · x + b_c` per class, argmax wins.
#[derive(Debug, Deserialize)]
#[serde(try_from = "LinearClassifierData")]
pub struct LinearClassifier {
    coefficients: Array2<f64>,
    intercepts: Array1<f64>,
}

/// On-disk shape of a model artifact: one coefficient row and one intercept
/// per class.
#[derive(Debug, Deserialize)]
struct LinearClassifierData {
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl TryFrom<LinearClassifierData> for LinearClassifier {
    type Error = anyhow::Error;

    fn try_from(data: LinearClassifierData) -> Result<Self> {
        let rows = data.coefficients.len();
        let cols = data.coefficients.first().map(Vec::len).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(anyhow!("model artifact has an empty coefficient matrix"));
        }

        let mut flat = Vec::with_capacity(rows * cols);
        for (row, weights) in data.coefficients.iter().enumerate() {
            if weights.len() != cols {
                return Err(anyhow!(
                    "coefficient row {row} has {} weights, expected {cols}",
                    weights.len()
                ));
            }
            flat.extend_from_slice(weights);
        }

        let coefficients = Array2::from_shape_vec((rows, cols), flat)?;
        LinearClassifier::new(coefficients, Array1::from(data.intercepts))
    }
}

impl LinearClassifier {
    pub fn new(coefficients: Array2<f64>, intercepts: Array1<f64>) -> Result<Self> {
        if coefficients.nrows() != intercepts.len() {
            return Err(anyhow!(
                "model has {} coefficient rows but {} intercepts",
                coefficients.nrows(),
                intercepts.len()
            ));
        }
        Ok(Self {
            coefficients,
            intercepts,
        })
    }
}

impl DecisionModel for LinearClassifier {
    fn predict(&self, features: &Array1<f64>) -> Result<usize> {
        let scores = self.decision_scores(features)?;
        scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(index, _)| index)
            .ok_or_else(|| anyhow!("model produced an empty score vector"))
    }

    fn decision_scores(&self, features: &Array1<f64>) -> Result<Array1<f64>> {
        if features.len() != self.coefficients.ncols() {
            return Err(anyhow!(
                "feature vector of length {} does not match model width {}",
                features.len(),
                self.coefficients.ncols()
            ));
        }
        Ok(self.coefficients.dot(features) + &self.intercepts)
    }

    fn n_classes(&self) -> usize {
        self.coefficients.nrows()
    }

    fn n_features(&self) -> usize {
        self.coefficients.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn model() -> LinearClassifier {
        LinearClassifier::new(
            array![[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]],
            array![0.0, -0.25, 0.5],
        )
        .unwrap()
    }

    #[test]
    fn test_decision_scores_are_affine() {
        let m = model();
        let scores = m.decision_scores(&array![2.0, 4.0]).unwrap();
        assert_eq!(scores, array![2.0, 3.75, 3.5]);
    }

    #[test]
    fn test_predict_is_argmax_of_scores() {
        let m = model();
        assert_eq!(m.predict(&array![2.0, 4.0]).unwrap(), 1);
        assert_eq!(m.predict(&array![4.0, 2.0]).unwrap(), 0);
    }

    #[test]
    fn test_feature_width_mismatch_is_an_error() {
        let m = model();
        assert!(m.decision_scores(&array![1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_deserialize_ragged_matrix_fails() {
        let raw = r#"{"coefficients": [[1.0, 2.0], [3.0]], "intercepts": [0.0, 0.0]}"#;
        assert!(serde_json::from_str::<LinearClassifier>(raw).is_err());
    }

    #[test]
    fn test_deserialize_intercept_mismatch_fails() {
        let raw = r#"{"coefficients": [[1.0], [2.0]], "intercepts": [0.0]}"#;
        assert!(serde_json::from_str::<LinearClassifier>(raw).is_err());
    }

    #[test]
    fn test_deserialize_valid_artifact() {
        let raw = r#"{"coefficients": [[1.0, -1.0], [0.0, 2.0]], "intercepts": [0.5, 0.0]}"#;
        let m: LinearClassifier = serde_json::from_str(raw).unwrap();
        assert_eq!(m.n_classes(), 2);
        assert_eq!(m.n_features(), 2);
    }
}
