//! Error types for the spam classifier

/// Result type alias using the classifier's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the model provider, training and start-up
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Model artifacts missing, unreadable or failing validation
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// The vectorizer could not produce a feature vector
    #[error("vectorization failed: {0}")]
    Vectorization(String),

    /// The classifier could not score a feature vector
    #[error("classification failed: {0}")]
    Classification(String),

    /// Offline fitting errors
    #[error("training failed: {0}")]
    Training(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Corpus reading errors
    #[error("dataset error: {0}")]
    Dataset(#[from] sms_data_clean::DataError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn model_unavailable(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    pub fn vectorization(msg: impl Into<String>) -> Self {
        Self::Vectorization(msg.into())
    }

    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification(msg.into())
    }

    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
