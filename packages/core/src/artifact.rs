//! Artifact resolution: locating and loading the trained classifier pair.
//!
//! A models directory holds many versioned artifact files. Exactly one model
//! and one vectorizer are selected and loaded, once per process. A failed or
//! empty load leaves the provider permanently unavailable until restart.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result, anyhow};

use crate::category::CATEGORIES;
use crate::model::{DecisionModel, LinearClassifier};
use crate::vectorizer::{TextVectorizer, TfidfVectorizer};

/// Filename prefix shared by all model artifacts.
pub const MODEL_PREFIX: &str = "mental_health_svm_model_";
/// Filename prefix shared by all vectorizer artifacts.
pub const VECTORIZER_PREFIX: &str = "tfidf_vectorizer_";

/// The loaded (vectorizer, decision model) pair.
///
/// Either both artifacts load and validate together, or the set does not
/// exist; a partial pair is never observable. Immutable for the process
/// lifetime and safe to share across concurrent inference calls.
pub struct ArtifactSet {
    version: String,
    vectorizer: Box<dyn TextVectorizer>,
    model: Box<dyn DecisionModel>,
}

impl ArtifactSet {
    pub fn new(
        version: impl Into<String>,
        vectorizer: Box<dyn TextVectorizer>,
        model: Box<dyn DecisionModel>,
    ) -> Result<Self> {
        if model.n_classes() != CATEGORIES.len() {
            return Err(anyhow!(
                "model emits {} classes, the category set has {}",
                model.n_classes(),
                CATEGORIES.len()
            ));
        }
        if vectorizer.n_features() != model.n_features() {
            return Err(anyhow!(
                "vectorizer produces {} features, the model expects {}",
                vectorizer.n_features(),
                model.n_features()
            ));
        }
        Ok(Self {
            version: version.into(),
            vectorizer,
            model,
        })
    }

    /// Version identifier derived from the selected model filename.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn vectorizer(&self) -> &dyn TextVectorizer {
        self.vectorizer.as_ref()
    }

    pub fn model(&self) -> &dyn DecisionModel {
        self.model.as_ref()
    }
}

/// Policy for picking the "latest" artifact among candidate filenames.
pub trait VersionSelector: Send + Sync {
    fn select(&self, candidates: &[String]) -> Option<String>;
}

/// Lexicographically maximal filename wins.
///
/// Assumes version suffixes sort the same lexicographically and
/// chronologically; zero-padded timestamps do.
pub struct LexicographicSelector;

impl VersionSelector for LexicographicSelector {
    fn select(&self, candidates: &[String]) -> Option<String> {
        candidates.iter().max().cloned()
    }
}

/// Hands the inference engine its artifact set, if one ever loaded.
///
/// `get` must be idempotent and safe under concurrent first calls: racing
/// callers converge on a single load attempt and observe the same outcome.
pub trait ArtifactProvider: Send + Sync {
    fn get(&self) -> Option<Arc<ArtifactSet>>;
}

/// Loads the newest artifact pair from a directory, at most once per process.
///
/// Any failure along the way (unreadable directory, missing files, malformed
/// JSON, cross-validation mismatch) is logged and cached as unavailable; the
/// load is never retried mid-process.
pub struct DirArtifactProvider {
    dir: PathBuf,
    selector: Box<dyn VersionSelector>,
    loaded: OnceLock<Option<Arc<ArtifactSet>>>,
}

impl DirArtifactProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_selector(dir, Box::new(LexicographicSelector))
    }

    pub fn with_selector(dir: impl Into<PathBuf>, selector: Box<dyn VersionSelector>) -> Self {
        Self {
            dir: dir.into(),
            selector,
            loaded: OnceLock::new(),
        }
    }

    fn candidates(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("reading artifact directory {}", self.dir.display()))?;

        let mut names = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            if let Some(name) = name.to_str()
                && name.starts_with(prefix)
            {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn load_json<T: serde::de::DeserializeOwned>(&self, file_name: &str) -> Result<T> {
        let path = self.dir.join(file_name);
        let bytes =
            fs::read(&path).with_context(|| format!("reading artifact {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("deserializing artifact {}", path.display()))
    }

    fn load(&self) -> Result<Option<ArtifactSet>> {
        let models = self.candidates(MODEL_PREFIX)?;
        let vectorizers = self.candidates(VECTORIZER_PREFIX)?;

        let (Some(model_file), Some(vectorizer_file)) = (
            self.selector.select(&models),
            self.selector.select(&vectorizers),
        ) else {
            return Ok(None);
        };

        let model: LinearClassifier = self.load_json(&model_file)?;
        let vectorizer: TfidfVectorizer = self.load_json(&vectorizer_file)?;
        let version = version_of(&model_file);

        let set = ArtifactSet::new(version, Box::new(vectorizer), Box::new(model))?;
        Ok(Some(set))
    }
}

impl ArtifactProvider for DirArtifactProvider {
    fn get(&self) -> Option<Arc<ArtifactSet>> {
        self.loaded
            .get_or_init(|| match self.load() {
                Ok(Some(set)) => {
                    tracing::info!(version = %set.version(), "loaded classifier artifacts");
                    Some(Arc::new(set))
                }
                Ok(None) => {
                    tracing::warn!(
                        dir = %self.dir.display(),
                        "no classifier artifacts found"
                    );
                    None
                }
                Err(err) => {
                    tracing::error!(
                        dir = %self.dir.display(),
                        error = %format!("{err:#}"),
                        "failed to load classifier artifacts"
                    );
                    None
                }
            })
            .clone()
    }
}

/// Strip the artifact prefix and extension from a model filename.
fn version_of(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    stem.strip_prefix(MODEL_PREFIX).unwrap_or(stem).to_string()
}
