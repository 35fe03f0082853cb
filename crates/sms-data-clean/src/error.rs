/// Result type alias for dataset operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors raised while reading a labelled SMS corpus
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: missing tab delimiter")]
    MissingDelimiter { line: usize },

    #[error("line {line}: invalid label {label:?}")]
    InvalidLabel { line: usize, label: String },
}
