use serde::{Deserialize, Serialize};
use sms_data_clean::Label;

use super::{Classifier, FeatureVector, Prediction};
use crate::error::{Error, Result};

pub const DEFAULT_ALPHA: f64 = 1.0;

/// Multinomial Naive Bayes over two classes.
///
/// Log-probabilities are summed per feature weight; the posterior comes from
/// log-sum-exp normalisation so long messages do not underflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    class_count: [f64; 2],
    class_log_prior: [f64; 2],
    feature_log_prob: [Vec<f64>; 2],
}

impl MultinomialNb {
    /// Fits class priors and smoothed per-class feature distributions.
    pub fn fit(x: &[FeatureVector], y: &[Label], alpha: f64) -> Result<Self> {
        if x.is_empty() {
            return Err(Error::training("cannot fit with empty data"));
        }
        if x.len() != y.len() {
            return Err(Error::training(format!(
                "{} samples but {} labels",
                x.len(),
                y.len()
            )));
        }
        if !(alpha > 0.0 && alpha.is_finite()) {
            return Err(Error::training(format!("alpha must be positive, got {alpha}")));
        }

        let n_features = x[0].dimension();
        let mut class_count = [0.0_f64; 2];
        let mut feature_count = [vec![0.0_f64; n_features], vec![0.0_f64; n_features]];
        for (sample, label) in x.iter().zip(y) {
            if sample.dimension() != n_features {
                return Err(Error::training(format!(
                    "sample has {} features, expected {n_features}",
                    sample.dimension()
                )));
            }
            let class = label.index();
            class_count[class] += 1.0;
            for (index, value) in sample.iter() {
                if value < 0.0 {
                    return Err(Error::training("negative feature value"));
                }
                feature_count[class][index] += value;
            }
        }

        if let Some(missing) = Label::ALL.iter().find(|label| class_count[label.index()] == 0.0) {
            return Err(Error::training(format!("no {missing} samples to fit")));
        }

        let total = class_count[0] + class_count[1];
        let class_log_prior = [
            (class_count[0] / total).ln(),
            (class_count[1] / total).ln(),
        ];
        let feature_log_prob = feature_count.map(|counts| {
            let smoothed_total: f64 = counts.iter().map(|c| c + alpha).sum();
            counts
                .iter()
                .map(|c| ((c + alpha) / smoothed_total).ln())
                .collect::<Vec<_>>()
        });

        tracing::debug!(
            samples = x.len(),
            features = n_features,
            spam = class_count[1],
            "naive bayes fitted"
        );
        Ok(Self {
            alpha,
            class_count,
            class_log_prior,
            feature_log_prob,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn n_features(&self) -> usize {
        self.feature_log_prob[0].len()
    }

    pub fn class_count(&self) -> [f64; 2] {
        self.class_count
    }

    /// Prior probability of each class.
    pub fn priors(&self) -> [f64; 2] {
        self.class_log_prior.map(f64::exp)
    }

    /// Checks internal consistency of a deserialized model.
    pub fn check(&self) -> Result<()> {
        if self.feature_log_prob[0].len() != self.feature_log_prob[1].len() {
            return Err(Error::classification("class feature tables differ in length"));
        }
        if self.n_features() == 0 {
            return Err(Error::classification("model has no features"));
        }
        let finite = self.class_log_prior.iter().all(|p| p.is_finite())
            && self.feature_log_prob.iter().flatten().all(|p| p.is_finite());
        if !finite {
            return Err(Error::classification("model holds non-finite log probabilities"));
        }
        Ok(())
    }

    fn joint_log_likelihood(&self, features: &FeatureVector) -> [f64; 2] {
        let mut jll = self.class_log_prior;
        for (class, log_probs) in self.feature_log_prob.iter().enumerate() {
            jll[class] += features
                .iter()
                .map(|(index, value)| value * log_probs[index])
                .sum::<f64>();
        }
        jll
    }
}

impl Classifier for MultinomialNb {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        if self.feature_log_prob[1].len() != self.n_features() {
            return Err(Error::classification("class feature tables differ in length"));
        }
        if features.dimension() != self.n_features() {
            return Err(Error::classification(format!(
                "expected {} features, got {}",
                self.n_features(),
                features.dimension()
            )));
        }

        let jll = self.joint_log_likelihood(features);
        let max = jll[0].max(jll[1]);
        let log_norm = max + ((jll[0] - max).exp() + (jll[1] - max).exp()).ln();
        let probabilities = jll.map(|log_p| (log_p - log_norm).exp());
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(Error::classification("posterior is not finite"));
        }

        let label = if probabilities[1] > probabilities[0] {
            Label::Spam
        } else {
            Label::Ham
        };
        Ok(Prediction {
            label,
            probabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(dimension: usize, entries: &[(usize, f64)]) -> FeatureVector {
        FeatureVector::from_entries(dimension, entries.iter().copied()).expect("in range")
    }

    fn fitted() -> MultinomialNb {
        // feature 0 = "free", 1 = "prize", 2 = "coffee", 3 = "meet"
        let x = vec![
            vector(4, &[(0, 2.0), (1, 1.0)]),
            vector(4, &[(0, 1.0), (1, 2.0)]),
            vector(4, &[(2, 2.0), (3, 1.0)]),
            vector(4, &[(2, 1.0), (3, 1.0)]),
            vector(4, &[(3, 2.0)]),
        ];
        let y = vec![Label::Spam, Label::Spam, Label::Ham, Label::Ham, Label::Ham];
        MultinomialNb::fit(&x, &y, DEFAULT_ALPHA).expect("fit should succeed")
    }

    #[test]
    fn test_priors() {
        let model = fitted();
        let priors = model.priors();
        assert!((priors[0] - 0.6).abs() < 1e-12);
        assert!((priors[1] - 0.4).abs() < 1e-12);
        assert_eq!(model.class_count(), [3.0, 2.0]);
    }

    #[test]
    fn test_feature_log_prob_is_smoothed() {
        let model = fitted();
        // spam counts: free 3, prize 3, coffee 0, meet 0; total 6 + 4 * alpha
        let expected = (1.0_f64 / 10.0).ln();
        assert!((model.feature_log_prob[1][2] - expected).abs() < 1e-12);
        let expected = (4.0_f64 / 10.0).ln();
        assert!((model.feature_log_prob[1][0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_predicts_spam_and_ham() {
        let model = fitted();
        let spam = model.predict(&vector(4, &[(0, 1.0), (1, 1.0)])).expect("predict");
        assert_eq!(spam.label, Label::Spam);
        assert!(spam.confidence() > 0.5);

        let ham = model.predict(&vector(4, &[(2, 1.0), (3, 1.0)])).expect("predict");
        assert_eq!(ham.label, Label::Ham);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = fitted();
        let prediction = model.predict(&vector(4, &[(0, 0.3), (3, 0.9)])).expect("predict");
        let sum: f64 = prediction.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(prediction.probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_zero_vector_falls_back_to_priors() {
        let model = fitted();
        let prediction = model.predict(&FeatureVector::zeros(4)).expect("predict");
        assert_eq!(prediction.label, Label::Ham);
        assert!((prediction.confidence() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_long_input_does_not_underflow() {
        let model = fitted();
        let prediction = model.predict(&vector(4, &[(0, 5_000.0)])).expect("predict");
        assert_eq!(prediction.label, Label::Spam);
        assert!(prediction.confidence() <= 1.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let model = fitted();
        let err = model.predict(&FeatureVector::zeros(3)).unwrap_err();
        assert!(matches!(err, Error::Classification(_)));
    }

    #[test]
    fn test_fit_requires_both_classes() {
        let x = vec![vector(2, &[(0, 1.0)])];
        assert!(MultinomialNb::fit(&x, &[Label::Ham], 1.0).is_err());
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let x = vec![vector(2, &[(0, 1.0)]), vector(3, &[(0, 1.0)])];
        assert!(MultinomialNb::fit(&x, &[Label::Ham, Label::Spam], 1.0).is_err());
        assert!(MultinomialNb::fit(&x[..1], &[Label::Ham, Label::Spam], 1.0).is_err());
        assert!(MultinomialNb::fit(&x[..1], &[Label::Ham], 0.0).is_err());
        assert!(MultinomialNb::fit(&[], &[], 1.0).is_err());
    }

    #[test]
    fn test_check() {
        let mut model = fitted();
        assert!(model.check().is_ok());
        model.feature_log_prob[0].pop();
        assert!(model.check().is_err());
    }
}
