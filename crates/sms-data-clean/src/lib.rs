//! Cleaning and normalization of SMS text for spam classification.
//!
//! [`Normalizer`] turns a raw message into the [`CanonicalText`] a fitted
//! vocabulary expects. [`TextStatistics`] describes the raw message for
//! display. [`RawDataset`] reads the labelled corpus used for fitting.

mod dataset;
mod error;
pub mod normalize;
mod stats;

pub use dataset::{Dataset, DatasetSummary, Label, RawData, RawDataset};
pub use error::{DataError, Result};
pub use normalize::{CanonicalText, Normalizer};
pub use stats::TextStatistics;
