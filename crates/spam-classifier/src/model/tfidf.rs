use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{FeatureVector, Vectorizer};
use crate::error::{Error, Result};

/// TF-IDF vectorizer over canonical text.
///
/// **Weighting:**
/// ```text
/// tfidf(t, d) = count(t, d) × idf(t)
/// idf(t)      = ln((1 + n) / (1 + df(t))) + 1
/// ```
/// Each document vector is then scaled to unit L2 norm. Terms are
/// whitespace tokens of at least two characters, joined into word n-grams
/// with a single space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
    #[serde(default)]
    max_features: Option<usize>,
}

const MIN_TOKEN_CHARS: usize = 2;

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self {
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            ngram_range: (1, 1),
            max_features: None,
        }
    }

    #[must_use]
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        let min_n = min_n.max(1);
        self.ngram_range = (min_n, max_n.max(min_n));
        self
    }

    /// Keeps only the `max_features` most frequent terms across the corpus.
    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    fn terms(&self, text: &str) -> Vec<String> {
        let tokens: Vec<&str> = text
            .split_whitespace()
            .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Learns vocabulary and IDF weights from documents.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(Error::training("cannot fit vectorizer on zero documents"));
        }

        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let terms = self.terms(doc.as_ref());
            let unique: HashSet<&String> = terms.iter().collect();
            for term in unique {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            for term in terms {
                *term_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut kept: Vec<(String, usize)> = term_freq.into_iter().collect();
        if let Some(max_features) = self.max_features {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            kept.truncate(max_features);
        }
        if kept.is_empty() {
            return Err(Error::training("empty vocabulary; documents contain no terms"));
        }

        let terms: BTreeMap<String, usize> = kept.into_iter().collect();
        let n_docs = documents.len() as f64;
        self.idf = terms
            .keys()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.vocabulary = terms
            .into_keys()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        tracing::debug!(terms = self.vocabulary.len(), documents = documents.len(), "vectorizer fitted");
        Ok(())
    }

    /// Checks internal consistency of a deserialized vectorizer.
    pub fn check(&self) -> Result<()> {
        if !self.is_fitted() {
            return Err(Error::vectorization("vocabulary is empty"));
        }
        if self.idf.len() != self.vocabulary.len() {
            return Err(Error::vectorization(format!(
                "{} idf weights for {} terms",
                self.idf.len(),
                self.vocabulary.len()
            )));
        }
        let mut seen = vec![false; self.idf.len()];
        for (term, &index) in &self.vocabulary {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(Error::vectorization(format!(
                        "term {term:?} has invalid index {index}"
                    )))
                }
            }
        }
        if self.idf.iter().any(|w| !w.is_finite()) {
            return Err(Error::vectorization("non-finite idf weight"));
        }
        Ok(())
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Vectorizer for TfidfVectorizer {
    fn vectorize(&self, text: &str) -> Result<FeatureVector> {
        if !self.is_fitted() {
            return Err(Error::vectorization("vocabulary is empty; fit the vectorizer first"));
        }

        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.terms(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut weighted = Vec::with_capacity(counts.len());
        for (index, count) in counts {
            let idf = self
                .idf
                .get(index)
                .ok_or_else(|| Error::vectorization(format!("no idf weight for index {index}")))?;
            weighted.push((index, count * idf));
        }
        let mut vector = FeatureVector::from_entries(self.dimension(), weighted)
            .ok_or_else(|| Error::vectorization("vocabulary index out of range"))?;

        let norm = vector.norm();
        if norm > 0.0 {
            vector.scale(1.0 / norm);
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.vocabulary.len()
    }
}
