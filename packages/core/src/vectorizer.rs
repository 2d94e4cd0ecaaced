//! Text feature extraction for the classifier.
//!
//! The engine only sees the [`TextVectorizer`] trait; the shipped
//! implementation is a TF-IDF vectorizer matching the offline training
//! pipeline's feature space.

use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::{Result, anyhow};
use ndarray::Array1;
use regex::Regex;
use serde::Deserialize;

/// Word token pattern: two word characters minimum, same as the trainer.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Turns raw text into the dense feature vector the decision model consumes.
///
/// Implementations are opaque to the engine; it only relies on a stable
/// output dimensionality for a given loaded artifact.
pub trait TextVectorizer: Send + Sync {
    fn transform(&self, text: &str) -> Result<Array1<f64>>;

    /// Dimensionality of the produced feature vectors.
    fn n_features(&self) -> usize;
}

/// TF-IDF vectorizer over a fixed vocabulary.
///
/// Lowercases the input, tokenizes on word boundaries, counts vocabulary
/// hits, scales each count by its column's idf weight and L2-normalizes the
/// result. Out-of-vocabulary tokens are ignored.
#[derive(Debug, Deserialize)]
#[serde(try_from = "TfidfData")]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

/// On-disk shape of a vectorizer artifact.
#[derive(Debug, Deserialize)]
struct TfidfData {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TryFrom<TfidfData> for TfidfVectorizer {
    type Error = anyhow::Error;

    fn try_from(data: TfidfData) -> Result<Self> {
        TfidfVectorizer::new(data.vocabulary, data.idf)
    }
}

impl TfidfVectorizer {
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f64>) -> Result<Self> {
        for (term, &column) in &vocabulary {
            if column >= idf.len() {
                return Err(anyhow!(
                    "vocabulary term `{term}` maps to column {column}, but only {} idf weights are present",
                    idf.len()
                ));
            }
        }
        Ok(Self { vocabulary, idf })
    }
}

impl TextVectorizer for TfidfVectorizer {
    fn transform(&self, text: &str) -> Result<Array1<f64>> {
        let mut weights = vec![0.0f64; self.idf.len()];
        let lowered = text.to_lowercase();

        for token in TOKEN_PATTERN.find_iter(&lowered) {
            if let Some(&column) = self.vocabulary.get(token.as_str()) {
                weights[column] += 1.0;
            }
        }

        for (weight, idf) in weights.iter_mut().zip(&self.idf) {
            *weight *= idf;
        }

        let mut features = Array1::from(weights);
        let norm = features.dot(&features).sqrt();
        if norm > 0.0 {
            features.mapv_inplace(|w| w / norm);
        }
        Ok(features)
    }

    fn n_features(&self) -> usize {
        self.idf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer() -> TfidfVectorizer {
        let vocabulary = HashMap::from([
            ("anxious".to_string(), 0),
            ("hopeless".to_string(), 1),
            ("pressure".to_string(), 2),
        ]);
        TfidfVectorizer::new(vocabulary, vec![1.0, 2.0, 1.0]).unwrap()
    }

    #[test]
    fn test_transform_counts_and_normalizes() {
        let v = vectorizer();
        let features = v.transform("Anxious, anxious and hopeless.").unwrap();

        // counts (2, 1, 0), idf-scaled to (2, 2, 0), L2 norm sqrt(8)
        let norm = 8.0f64.sqrt();
        assert!((features[0] - 2.0 / norm).abs() < 1e-12);
        assert!((features[1] - 2.0 / norm).abs() < 1e-12);
        assert_eq!(features[2], 0.0);
    }

    #[test]
    fn test_transform_ignores_unknown_tokens() {
        let v = vectorizer();
        let features = v.transform("nothing in the vocabulary here").unwrap();
        assert!(features.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_transform_is_case_insensitive() {
        let v = vectorizer();
        let upper = v.transform("ANXIOUS thoughts").unwrap();
        let lower = v.transform("anxious thoughts").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_single_character_tokens_are_skipped() {
        let v = vectorizer();
        // `a` never matches the two-character token pattern
        let features = v.transform("a a a a a").unwrap();
        assert!(features.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_new_rejects_out_of_range_column() {
        let vocabulary = HashMap::from([("term".to_string(), 3)]);
        assert!(TfidfVectorizer::new(vocabulary, vec![1.0, 1.0]).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let raw = r#"{"vocabulary": {"term": 9}, "idf": [1.0]}"#;
        assert!(serde_json::from_str::<TfidfVectorizer>(raw).is_err());

        let raw = r#"{"vocabulary": {"term": 0}, "idf": [1.0]}"#;
        let v: TfidfVectorizer = serde_json::from_str(raw).unwrap();
        assert_eq!(v.n_features(), 1);
    }
}
