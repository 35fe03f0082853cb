use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use crate::normalize::{CanonicalText, Normalizer};

/// Message class. `Ham` is the not-spam class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Ham,
    Spam,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Ham, Label::Spam];

    /// Class index used by the model: 0 for ham, 1 for spam.
    pub fn index(self) -> usize {
        match self {
            Label::Ham => 0,
            Label::Spam => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Label::Ham),
            1 => Some(Label::Spam),
            _ => None,
        }
    }

    pub fn is_spam(self) -> bool {
        self == Label::Spam
    }
}

impl FromStr for Label {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ham" => Ok(Label::Ham),
            "spam" => Ok(Label::Spam),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Ham => f.write_str("Not Spam"),
            Label::Spam => f.write_str("Spam"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RawData {
    pub label: Label,
    pub sms: String,
}

/// Labelled corpus in the SMS Spam Collection layout: `label<TAB>message`.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub data: Vec<RawData>,
}

/// Corpus figures shown alongside the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total: usize,
    pub spam: usize,
    pub ham: usize,
    /// Mean message length in characters.
    pub average_length: f64,
}

impl DatasetSummary {
    pub fn spam_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.spam as f64 / self.total as f64
    }
}

impl RawDataset {
    pub fn from_file<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut data = Vec::new();
        for (number, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let (label, sms) = line
                .split_once('\t')
                .ok_or(DataError::MissingDelimiter { line: number + 1 })?;
            let label = Label::from_str(label.trim()).map_err(|_| DataError::InvalidLabel {
                line: number + 1,
                label: label.to_string(),
            })?;
            data.push(RawData {
                label,
                sms: sms.to_string(),
            });
        }
        tracing::debug!(messages = data.len(), "dataset loaded");
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> DatasetSummary {
        let spam = self.data.iter().filter(|row| row.label.is_spam()).count();
        let characters: usize = self.data.iter().map(|row| row.sms.chars().count()).sum();
        DatasetSummary {
            total: self.len(),
            spam,
            ham: self.len() - spam,
            average_length: if self.is_empty() {
                0.0
            } else {
                characters as f64 / self.len() as f64
            },
        }
    }

    pub fn normalize(&self, normalizer: &Normalizer) -> Dataset {
        let (labels, data) = self
            .data
            .iter()
            .map(|row| (row.label, normalizer.normalize(&row.sms)))
            .unzip();
        Dataset { labels, data }
    }
}

/// Normalized corpus, ready for fitting.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub labels: Vec<Label>,
    pub data: Vec<CanonicalText>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const CORPUS: &str = "ham\tGo until jurong point, crazy.. Available only in bugis n great world la e buffet...\n\
ham\tOk lar... Joking wif u oni...\n\
spam\tFree entry in 2 a wkly comp to win FA Cup final tkts 21st May 2005.\n\
\n\
ham\tU dun say so early hor... U c already then say...\n";

    #[test]
    fn test_reader_load() {
        let dataset = RawDataset::from_reader(CORPUS.as_bytes()).expect("creation failed");
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.data[0].label, Label::Ham);
        assert_eq!(dataset.data[2].label, Label::Spam);
        assert_eq!(dataset.data[1].sms.split_ascii_whitespace().count(), 6);
    }

    #[test]
    fn test_missing_delimiter() {
        let err = RawDataset::from_reader("ham\tok\nspam no tab\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingDelimiter { line: 2 }));
    }

    #[test]
    fn test_invalid_label() {
        let err = RawDataset::from_reader("eggs\thello\n".as_bytes()).unwrap_err();
        match err {
            DataError::InvalidLabel { line, label } => {
                assert_eq!(line, 1);
                assert_eq!(label, "eggs");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_summary() {
        let dataset = RawDataset::from_reader(CORPUS.as_bytes()).expect("creation failed");
        let summary = dataset.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.spam, 1);
        assert_eq!(summary.ham, 3);
        assert!((summary.spam_ratio() - 0.25).abs() < f64::EPSILON);
        assert!(summary.average_length > 0.0);
        assert_eq!(RawDataset::default().summary(), DatasetSummary::default());
    }

    #[test]
    fn test_normalize() {
        let dataset = RawDataset::from_reader(CORPUS.as_bytes())
            .expect("creation failed")
            .normalize(&Normalizer::english());
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.labels[2], Label::Spam);
        assert!(dataset.data[2].tokens().any(|token| token == "free"));
        assert!(dataset.data.iter().all(|text| !text.as_str().contains('.')));
    }

    #[test]
    fn test_label_roundtrip() {
        for label in Label::ALL {
            assert_eq!(Label::from_index(label.index()), Some(label));
        }
        assert_eq!(Label::from_index(2), None);
        assert_eq!(Label::Spam.to_string(), "Spam");
        assert_eq!(Label::Ham.to_string(), "Not Spam");
    }
}
