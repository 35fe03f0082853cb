//! Discovery, loading and validation of the persisted model pair.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Classifier, MultinomialNb, TfidfVectorizer, Vectorizer};

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const CLASSIFIER_FILE: &str = "mnb_model.json";

/// Sub-directories searched under the model root, in order.
pub const SEARCH_DIRS: [&str; 3] = ["", "models", "model"];

const PROBE_TEXT: &str = "test message";

/// Resolved locations of the artifact pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub classifier: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            vectorizer: dir.join(VECTORIZER_FILE),
            classifier: dir.join(CLASSIFIER_FILE),
        }
    }

    /// First search directory under `root` holding both files.
    pub fn discover(root: &Path) -> Option<Self> {
        SEARCH_DIRS
            .iter()
            .map(|sub| Self::in_dir(&root.join(sub)))
            .find(|paths| paths.vectorizer.is_file() && paths.classifier.is_file())
    }
}

/// Fitted vectorizer and classifier, loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct SpamModel {
    pub vectorizer: TfidfVectorizer,
    pub classifier: MultinomialNb,
}

impl SpamModel {
    pub fn new(vectorizer: TfidfVectorizer, classifier: MultinomialNb) -> Self {
        Self {
            vectorizer,
            classifier,
        }
    }

    /// Discovers, reads and validates the artifact pair under `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let paths = ArtifactPaths::discover(root).ok_or_else(|| {
            let expected = SEARCH_DIRS
                .iter()
                .map(|sub| root.join(sub).display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Error::model_unavailable(format!(
                "{VECTORIZER_FILE} and {CLASSIFIER_FILE} not found in any of: {expected}"
            ))
        })?;
        Self::load_from(&paths)
    }

    pub fn load_from(paths: &ArtifactPaths) -> Result<Self> {
        let vectorizer: TfidfVectorizer = read_json(&paths.vectorizer)?;
        let classifier: MultinomialNb = read_json(&paths.classifier)?;
        let model = Self::new(vectorizer, classifier);
        model.validate()?;

        tracing::info!(
            vectorizer = %paths.vectorizer.display(),
            classifier = %paths.classifier.display(),
            features = model.vectorizer.dimension(),
            "model loaded"
        );
        Ok(model)
    }

    /// Writes the artifact pair into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<ArtifactPaths> {
        fs::create_dir_all(dir)?;
        let paths = ArtifactPaths::in_dir(dir);
        write_json(&paths.vectorizer, &self.vectorizer)?;
        write_json(&paths.classifier, &self.classifier)?;
        tracing::info!(dir = %dir.display(), "model saved");
        Ok(paths)
    }

    /// Confirms the pair is fitted and consistent by running a probe through it.
    pub fn validate(&self) -> Result<()> {
        self.vectorizer
            .check()
            .and_then(|_| self.classifier.check())
            .map_err(|e| Error::model_unavailable(format!("models are not properly fitted: {e}")))?;

        if self.vectorizer.dimension() != self.classifier.n_features() {
            return Err(Error::model_unavailable(format!(
                "vectorizer has {} features but classifier expects {}",
                self.vectorizer.dimension(),
                self.classifier.n_features()
            )));
        }

        self.vectorizer
            .vectorize(PROBE_TEXT)
            .and_then(|features| self.classifier.predict(&features))
            .map(|_| ())
            .map_err(|e| Error::model_unavailable(format!("models are not properly fitted: {e}")))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::model_unavailable(format!("failed to read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::model_unavailable(format!("failed to parse {}: {e}", path.display()))
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string(value)?;
    fs::write(path, content)?;
    Ok(())
}
