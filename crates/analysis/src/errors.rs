use thiserror::Error;

/// Error type for loading and writing tabular inputs.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
    #[error("Invalid value '{value}' in column '{column}' on line {line}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },
    #[error("Duplicate sample id '{0}'")]
    DuplicateSample(String),
}
