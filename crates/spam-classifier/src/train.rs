//! Offline fitting of the vectorizer + classifier pair.

use serde::{Deserialize, Serialize};
use smartcore::metrics::accuracy::Accuracy;
use smartcore::metrics::f1::F1;
use smartcore::metrics::precision::Precision;
use smartcore::metrics::recall::Recall;
use smartcore::metrics::Metrics;
use sms_data_clean::{CanonicalText, Dataset, Label};

use crate::artifacts::SpamModel;
use crate::error::{Error, Result};
use crate::model::{
    Classifier, FeatureVector, MultinomialNb, TfidfVectorizer, Vectorizer, DEFAULT_ALPHA,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Additive smoothing for the classifier.
    pub alpha: f64,
    /// Share of messages held out for scoring, in `[0, 1)`.
    pub test_fraction: f64,
    pub max_features: Option<usize>,
    pub ngram_range: (usize, usize),
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            test_fraction: 0.2,
            max_features: Some(3000),
            ngram_range: (1, 1),
        }
    }
}

/// Scores on the held-out split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub samples: usize,
    pub accuracy: f64,
    /// Spam-class scores; absent unless both classes occur in the split.
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub model: SpamModel,
    pub train_samples: usize,
    pub evaluation: Option<Evaluation>,
}

/// Splits indices without shuffling: every `stride`-th message is held out.
fn holdout_split(len: usize, test_fraction: f64) -> (Vec<usize>, Vec<usize>) {
    if test_fraction <= 0.0 || len < 2 {
        return ((0..len).collect(), Vec::new());
    }
    let stride = ((1.0 / test_fraction).round() as usize).max(2);
    (0..len).partition(|i| (i + 1) % stride != 0)
}

pub fn train(dataset: &Dataset, params: &TrainingParams) -> Result<TrainingReport> {
    if dataset.is_empty() {
        return Err(Error::training("dataset is empty"));
    }
    if !(0.0..1.0).contains(&params.test_fraction) {
        return Err(Error::training(format!(
            "test_fraction must be in [0, 1), got {}",
            params.test_fraction
        )));
    }

    let (train_idx, test_idx) = holdout_split(dataset.len(), params.test_fraction);
    let docs: Vec<&CanonicalText> = train_idx.iter().map(|&i| &dataset.data[i]).collect();
    let labels: Vec<Label> = train_idx.iter().map(|&i| dataset.labels[i]).collect();

    let mut vectorizer = TfidfVectorizer::new()
        .with_ngram_range(params.ngram_range.0, params.ngram_range.1);
    if let Some(max_features) = params.max_features {
        vectorizer = vectorizer.with_max_features(max_features);
    }
    vectorizer.fit(&docs)?;

    let x = vectorize_all(&vectorizer, docs.iter().copied())?;
    let classifier = MultinomialNb::fit(&x, &labels, params.alpha)?;
    let model = SpamModel::new(vectorizer, classifier);

    let evaluation = if test_idx.is_empty() {
        None
    } else {
        let docs = test_idx.iter().map(|&i| &dataset.data[i]);
        let truth: Vec<Label> = test_idx.iter().map(|&i| dataset.labels[i]).collect();
        Some(evaluate(&model, docs, &truth)?)
    };

    tracing::info!(
        train = train_idx.len(),
        test = test_idx.len(),
        features = model.vectorizer.dimension(),
        accuracy = evaluation.map(|e| e.accuracy),
        "training finished"
    );
    Ok(TrainingReport {
        model,
        train_samples: train_idx.len(),
        evaluation,
    })
}

fn vectorize_all<'a, I>(vectorizer: &TfidfVectorizer, docs: I) -> Result<Vec<FeatureVector>>
where
    I: IntoIterator<Item = &'a CanonicalText>,
{
    docs.into_iter()
        .map(|doc| vectorizer.vectorize(doc.as_str()))
        .collect()
}

/// Scores `model` against labelled canonical texts.
pub fn evaluate<'a, I>(model: &SpamModel, docs: I, truth: &[Label]) -> Result<Evaluation>
where
    I: IntoIterator<Item = &'a CanonicalText>,
{
    let predicted = vectorize_all(&model.vectorizer, docs)?
        .iter()
        .map(|features| model.classifier.predict(features).map(|p| p.label))
        .collect::<Result<Vec<_>>>()?;
    if predicted.len() != truth.len() {
        return Err(Error::training(format!(
            "{} predictions for {} labels",
            predicted.len(),
            truth.len()
        )));
    }

    let y_true: Vec<f64> = truth.iter().map(|label| label.index() as f64).collect();
    let y_pred: Vec<f64> = predicted.iter().map(|label| label.index() as f64).collect();

    let binary = Label::ALL.iter().all(|label| truth.contains(label));
    let (precision, recall, f1) = if binary {
        (
            Some(Precision::<f64>::new().get_score(&y_true, &y_pred)),
            Some(Recall::<f64>::new().get_score(&y_true, &y_pred)),
            Some(F1::<f64>::new_with(1.0).get_score(&y_true, &y_pred)),
        )
    } else {
        (None, None, None)
    };

    Ok(Evaluation {
        samples: truth.len(),
        accuracy: Accuracy::<f64>::new().get_score(&y_true, &y_pred),
        precision,
        recall,
        f1,
    })
}
