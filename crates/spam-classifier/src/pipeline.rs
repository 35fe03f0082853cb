//! Raw message in, decision out.
//!
//! [`classify`] runs normalize, vectorize, predict for one message and never
//! fails: blank input is reported as [`Outcome::Empty`] without touching the
//! model, and anything the model provider raises (errors and panics alike)
//! comes back as [`Outcome::Failed`].

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use sms_data_clean::{CanonicalText, Label, Normalizer, TextStatistics};

use crate::artifacts::SpamModel;
use crate::model::{Classifier, Prediction, Vectorizer};

/// Label with the confidence it was chosen with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub label: Label,
    /// Maximum posterior probability, in `[0, 1]`.
    pub confidence: f64,
    pub probabilities: [f64; 2],
}

impl From<Prediction> for ClassificationResult {
    fn from(prediction: Prediction) -> Self {
        Self {
            label: prediction.label,
            confidence: prediction.confidence(),
            probabilities: prediction.probabilities,
        }
    }
}

/// Everything produced for a classified message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub result: ClassificationResult,
    pub canonical: CanonicalText,
    pub stats: TextStatistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Vectorization,
    Classification,
}

/// Model provider failure, with a readable cause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub cause: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Blank input; nothing to classify.
    Empty,
    Classified(Analysis),
    Failed(Failure),
}

impl Outcome {
    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            Outcome::Classified(analysis) => Some(analysis),
            _ => None,
        }
    }

    pub fn is_spam(&self) -> bool {
        self.analysis()
            .map(|analysis| analysis.result.label.is_spam())
            .unwrap_or(false)
    }
}

/// Classifies one raw message against an explicitly supplied model.
pub fn classify(
    raw: &str,
    normalizer: &Normalizer,
    vectorizer: &dyn Vectorizer,
    classifier: &dyn Classifier,
) -> Outcome {
    if raw.trim().is_empty() {
        return Outcome::Empty;
    }

    let canonical = normalizer.normalize(raw);
    let stats = TextStatistics::with_canonical(raw, &canonical);
    tracing::debug!(
        chars = stats.original_length,
        tokens = stats.processed_word_count,
        "message normalized"
    );

    let features = match guarded(FailureKind::Vectorization, || {
        vectorizer.vectorize(canonical.as_str())
    }) {
        Ok(features) => features,
        Err(failure) => return failed(failure),
    };

    let prediction = match guarded(FailureKind::Classification, || classifier.predict(&features)) {
        Ok(prediction) => prediction,
        Err(failure) => return failed(failure),
    };

    let result = ClassificationResult::from(prediction);
    tracing::debug!(
        label = ?result.label,
        confidence = result.confidence,
        features = features.nnz(),
        "message classified"
    );
    Outcome::Classified(Analysis {
        result,
        canonical,
        stats,
    })
}

/// Runs a provider call, turning both its errors and its panics into a
/// [`Failure`] of the stage's `kind`.
fn guarded<T>(
    kind: FailureKind,
    call: impl FnOnce() -> crate::Result<T>,
) -> Result<T, Failure> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(Failure {
            kind,
            cause: err.to_string(),
        }),
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(Failure {
                kind,
                cause: format!("model provider panicked: {detail}"),
            })
        }
    }
}

fn failed(failure: Failure) -> Outcome {
    tracing::warn!(kind = ?failure.kind, cause = %failure.cause, "classification failed");
    Outcome::Failed(failure)
}

/// Normalizer plus model provider, built once at start-up and shared by
/// reference across requests.
#[derive(Debug)]
pub struct SpamDetector<V, C> {
    normalizer: Normalizer,
    vectorizer: V,
    classifier: C,
}

impl<V: Vectorizer, C: Classifier> SpamDetector<V, C> {
    pub fn new(normalizer: Normalizer, vectorizer: V, classifier: C) -> Self {
        Self {
            normalizer,
            vectorizer,
            classifier,
        }
    }

    pub fn classify(&self, raw: &str) -> Outcome {
        classify(raw, &self.normalizer, &self.vectorizer, &self.classifier)
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }
}

impl SpamDetector<crate::model::TfidfVectorizer, crate::model::MultinomialNb> {
    pub fn from_model(normalizer: Normalizer, model: SpamModel) -> Self {
        Self::new(normalizer, model.vectorizer, model.classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::FeatureVector;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and returns a fixed distribution.
    #[derive(Default)]
    struct Fixed {
        calls: AtomicUsize,
    }

    impl Vectorizer for Fixed {
        fn vectorize(&self, text: &str) -> crate::Result<FeatureVector> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FeatureVector::from_entries(4, text.split(' ').filter(|t| !t.is_empty()).map(|_| (0, 1.0)))
                .expect("in range"))
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    impl Classifier for Fixed {
        fn predict(&self, _features: &FeatureVector) -> crate::Result<Prediction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Prediction {
                label: Label::Spam,
                probabilities: [0.25, 0.75],
            })
        }
    }

    struct Broken;

    impl Vectorizer for Broken {
        fn vectorize(&self, _text: &str) -> crate::Result<FeatureVector> {
            Err(Error::vectorization("vocabulary mismatch"))
        }

        fn dimension(&self) -> usize {
            0
        }
    }

    impl Classifier for Broken {
        fn predict(&self, _features: &FeatureVector) -> crate::Result<Prediction> {
            panic!("corrupt weights")
        }
    }

    #[test]
    fn test_empty_input_skips_model() {
        let normalizer = Normalizer::english();
        let model = Fixed::default();
        for raw in ["", "   ", "\n\t"] {
            assert_eq!(classify(raw, &normalizer, &model, &model), Outcome::Empty);
        }
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_confidence_is_max_probability() {
        let normalizer = Normalizer::english();
        let model = Fixed::default();
        let outcome = classify("Free prize inside", &normalizer, &model, &model);
        let analysis = outcome.analysis().expect("classified");
        assert_eq!(analysis.result.label, Label::Spam);
        assert_eq!(analysis.result.confidence, 0.75);
        assert_eq!(analysis.canonical, normalizer.normalize("Free prize inside"));
        assert_eq!(analysis.stats, normalizer.stats("Free prize inside"));
        assert!(outcome.is_spam());
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_digits_only_still_classified() {
        let normalizer = Normalizer::english();
        let model = Fixed::default();
        let outcome = classify("12345", &normalizer, &model, &model);
        let analysis = outcome.analysis().expect("classified");
        assert!(analysis.canonical.is_empty());
    }

    #[test]
    fn test_vectorizer_error_is_typed_failure() {
        let normalizer = Normalizer::english();
        let outcome = classify("hello", &normalizer, &Broken, &Fixed::default());
        match outcome {
            Outcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::Vectorization);
                assert!(failure.cause.contains("vocabulary mismatch"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    /// Fails with an error unrelated to vectorization itself.
    struct MissingVocabulary;

    impl Vectorizer for MissingVocabulary {
        fn vectorize(&self, _text: &str) -> crate::Result<FeatureVector> {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "vocab file gone",
            )))
        }

        fn dimension(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_failure_kind_follows_stage() {
        let normalizer = Normalizer::english();
        let outcome = classify("hello", &normalizer, &MissingVocabulary, &Fixed::default());
        match outcome {
            Outcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::Vectorization);
                assert!(failure.cause.contains("vocab file gone"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_classifier_panic_is_caught() {
        let normalizer = Normalizer::english();
        let outcome = classify("hello", &normalizer, &Fixed::default(), &Broken);
        match outcome {
            Outcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::Classification);
                assert!(failure.cause.contains("corrupt weights"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_detector_with_boxed_provider() {
        let vectorizer: Box<dyn Vectorizer> = Box::new(Fixed::default());
        let classifier: Box<dyn Classifier> = Box::new(Fixed::default());
        let detector = SpamDetector::new(Normalizer::english(), vectorizer, classifier);
        assert!(detector.classify("win cash").is_spam());
        assert_eq!(detector.classify(" "), Outcome::Empty);
    }

    #[test]
    fn test_outcome_json_shape() {
        let failure = Outcome::Failed(Failure {
            kind: FailureKind::Vectorization,
            cause: "boom".into(),
        });
        let json = serde_json::to_value(&failure).expect("serialize");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "vectorization");
        assert_eq!(serde_json::to_value(Outcome::Empty).expect("serialize")["status"], "empty");
    }
}
