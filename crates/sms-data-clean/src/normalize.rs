//! Text normalization for the spam vocabulary.
//!
//! Raw SMS text goes through a fixed sequence of steps: lowercase, strip
//! ASCII punctuation, delete digit runs, split into words, keep alphabetic
//! tokens, drop stopwords, stem. The order matters: the fitted vocabulary was
//! built from exactly this sequence.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use stopwords::{Language, Stopwords, NLTK};
use unicode_segmentation::UnicodeSegmentation;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit pattern"));

/// Characters treated as a clitic boundary inside a word.
const APOSTROPHES: [char; 4] = ['\'', '\u{2019}', '\u{2018}', '\u{02BC}'];

/// Space-joined sequence of stemmed tokens, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalText(String);

impl CanonicalText {
    fn from_tokens(tokens: &[String]) -> Self {
        Self(tokens.join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|token| !token.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for CanonicalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn lowercase(text: &str) -> String {
    text.to_lowercase()
}

/// Removes every character of the ASCII punctuation set.
pub fn strip_punctuation(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

/// Deletes digit runs outright.
///
/// Letters on both sides of a run end up adjacent: `"im29now"` becomes
/// `"imnow"`. Vocabularies fitted against this pipeline depend on that.
pub fn strip_digits(text: &str) -> String {
    DIGIT_RUN.replace_all(text, "").into_owned()
}

/// Splits text into word-like units on Unicode word boundaries.
///
/// Whitespace segments are dropped. A word carrying an apostrophe is split
/// in front of it, so `you’re` yields `you` and `’re`.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    for segment in text.split_word_bounds() {
        if segment.chars().all(char::is_whitespace) {
            continue;
        }
        match segment.char_indices().find(|(i, c)| *i > 0 && APOSTROPHES.contains(c)) {
            Some((at, _)) => {
                tokens.push(&segment[..at]);
                tokens.push(&segment[at..]);
            }
            None => tokens.push(segment),
        }
    }
    tokens
}

/// True for a non-empty token made only of letters.
pub fn is_alphabetic_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_alphabetic() && !c.is_numeric())
}

/// Stopword set plus stemmer, built once and shared by reference.
///
/// Stems come from the Snowball English algorithm (Porter2), not the 1980
/// Porter rules; a handful of suffixes differ (`generously` keeps `generous`).
pub struct Normalizer {
    stopwords: HashSet<String>,
    stemmer: Stemmer,
}

impl Normalizer {
    /// NLTK English stopwords with the English Snowball stemmer.
    pub fn english() -> Self {
        let stopwords = NLTK::stopwords(Language::English)
            .into_iter()
            .flatten()
            .map(|word| word.to_string());
        Self::with_stopwords(stopwords)
    }

    pub fn with_stopwords<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        // Punctuation is gone by the time tokens meet the set, so `don't`
        // must also match as `dont`.
        let stopwords: HashSet<String> = stopwords
            .into_iter()
            .map(Into::into)
            .flat_map(|word: String| {
                let stripped = strip_punctuation(&word);
                [word, stripped]
            })
            .filter(|word| !word.is_empty())
            .collect();
        tracing::debug!(stopwords = stopwords.len(), "normalizer ready");
        Self {
            stopwords,
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }

    pub fn stem(&self, token: &str) -> String {
        self.stemmer.stem(token).into_owned()
    }

    /// Ordered stemmed tokens of `raw`.
    ///
    /// A stem that lands on a stopword (`ons` to `on`) is dropped as well.
    pub fn tokens(&self, raw: &str) -> Vec<String> {
        let text = strip_digits(&strip_punctuation(&lowercase(raw)));
        tokenize(&text)
            .into_iter()
            .filter(|token| is_alphabetic_token(token))
            .filter(|token| !self.is_stopword(token))
            .map(|token| self.stem(token))
            .filter(|stem| !self.is_stopword(stem))
            .collect()
    }

    pub fn normalize(&self, raw: &str) -> CanonicalText {
        CanonicalText::from_tokens(&self.tokens(raw))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("stopwords", &self.stopwords.len())
            .field("stemmer", &"english")
            .finish()
    }
}
