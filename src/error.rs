use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Invalid {field} '{value}' at line {line}")]
    ValueParse {
        field: &'static str,
        value: String,
        line: u64,
    },

    #[error("Paired streams diverge at line {line}: primary {primary}, secondary {secondary}")]
    AlignmentMismatch {
        line: u64,
        primary: String,
        secondary: String,
    },

    #[error("Paired streams have different lengths: {0}")]
    LengthMismatch(String),

    #[error("Required input does not exist: {}", .0.display())]
    MissingDependency(PathBuf),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Unknown aggregation kind: {0}")]
    UnknownAggregation(String),
}

impl From<config::ConfigError> for ProcessingError {
    fn from(err: config::ConfigError) -> Self {
        ProcessingError::Config(err.to_string())
    }
}
