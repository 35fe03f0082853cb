//! Model provider capabilities.
//!
//! The orchestrator only sees [`Vectorizer`] and [`Classifier`]. Any fitted
//! model that implements both can stand in for the TF-IDF + Naive Bayes pair.

mod naive_bayes;
mod tfidf;

pub use naive_bayes::{MultinomialNb, DEFAULT_ALPHA};
pub use tfidf::TfidfVectorizer;

use serde::{Deserialize, Serialize};
use sms_data_clean::Label;

use crate::error::Result;

/// Sparse vector over a fixed vocabulary.
///
/// Entries are sorted by index and never repeat an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    dimension: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    /// Builds a vector from `(index, value)` pairs.
    ///
    /// Values at the same index are summed; zeros are dropped. Indices at or
    /// past `dimension` are rejected.
    pub fn from_entries<I>(dimension: usize, entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let mut merged = std::collections::BTreeMap::new();
        for (index, value) in entries {
            if index >= dimension {
                return None;
            }
            *merged.entry(index).or_insert(0.0) += value;
        }
        Some(Self {
            dimension,
            entries: merged.into_iter().filter(|(_, value)| *value != 0.0).collect(),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |(i, _)| *i)
            .map(|at| self.entries[at].1)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }

    pub(crate) fn scale(&mut self, factor: f64) {
        for (_, value) in &mut self.entries {
            *value *= factor;
        }
    }
}

/// Label plus the full class distribution, indexed by [`Label::index`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    pub probabilities: [f64; 2],
}

impl Prediction {
    pub fn confidence(&self) -> f64 {
        self.probabilities[0].max(self.probabilities[1])
    }

    pub fn probability(&self, label: Label) -> f64 {
        self.probabilities[label.index()]
    }
}

/// Maps canonical text to a feature vector.
pub trait Vectorizer: Send + Sync {
    /// Empty input must yield the zero vector, not an error.
    fn vectorize(&self, text: &str) -> Result<FeatureVector>;

    fn dimension(&self) -> usize;
}

/// Scores a feature vector.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction>;
}

impl<T: Vectorizer + ?Sized> Vectorizer for &T {
    fn vectorize(&self, text: &str) -> Result<FeatureVector> {
        (**self).vectorize(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }
}

impl<T: Classifier + ?Sized> Classifier for &T {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        (**self).predict(features)
    }
}

impl<T: Vectorizer + ?Sized> Vectorizer for Box<T> {
    fn vectorize(&self, text: &str) -> Result<FeatureVector> {
        (**self).vectorize(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }
}

impl<T: Classifier + ?Sized> Classifier for Box<T> {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        (**self).predict(features)
    }
}
