//! SMS spam classification.
//!
//! A raw message is normalized by [`sms_data_clean::Normalizer`], turned into
//! TF-IDF features and scored by Multinomial Naive Bayes. The model pair is
//! fitted offline ([`train`]), persisted as JSON ([`artifacts`]) and loaded once
//! at start-up into a [`SpamDetector`].

pub mod artifacts;
pub mod config;
mod error;
pub mod model;
pub mod pipeline;
pub mod train;

pub use artifacts::SpamModel;
pub use error::{Error, Result};
pub use pipeline::{
    classify, Analysis, ClassificationResult, Failure, FailureKind, Outcome, SpamDetector,
};
pub use sms_data_clean::{CanonicalText, Label, Normalizer, TextStatistics};
