use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::normalize::{CanonicalText, Normalizer};

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid number pattern"));

/// Read-only snapshot of a message, for display only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStatistics {
    pub original_length: usize,
    pub word_count: usize,
    pub processed_length: usize,
    pub processed_word_count: usize,
    pub sentence_count: usize,
    pub char_count_no_spaces: usize,
    pub uppercase_count: usize,
    pub punctuation_count: usize,
    /// Maximal digit runs, so `"call 0800 now 2"` counts two.
    pub number_count: usize,
}

impl TextStatistics {
    pub fn from_text(raw: &str, normalizer: &Normalizer) -> Self {
        if raw.is_empty() {
            return Self::default();
        }
        Self::with_canonical(raw, &normalizer.normalize(raw))
    }

    /// Statistics for `raw` when its canonical form is already known.
    pub fn with_canonical(raw: &str, processed: &CanonicalText) -> Self {
        if raw.is_empty() {
            return Self::default();
        }

        Self {
            original_length: raw.chars().count(),
            word_count: raw.split_whitespace().count(),
            processed_length: processed.len(),
            processed_word_count: processed.tokens().count(),
            sentence_count: raw
                .unicode_sentences()
                .filter(|sentence| !sentence.trim().is_empty())
                .count(),
            char_count_no_spaces: raw.chars().filter(|c| *c != ' ').count(),
            uppercase_count: raw.chars().filter(|c| c.is_uppercase()).count(),
            punctuation_count: raw.chars().filter(|c| c.is_ascii_punctuation()).count(),
            number_count: NUMBER.find_iter(raw).count(),
        }
    }
}

impl Normalizer {
    pub fn stats(&self, raw: &str) -> TextStatistics {
        TextStatistics::from_text(raw, self)
    }
}
