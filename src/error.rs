use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Could not connect to PostgreSQL: {0}")]
    Connection(#[source] postgres::Error),
    #[error("Could not read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{}' is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Dataset must be a JSON array of records")]
    NotAnArray,
    #[error("Dataset contains no records")]
    EmptyDataset,
    #[error("Record {index} is not a JSON object")]
    InvalidRecord { index: usize },
    #[error("Record {index} has no field '{field}'")]
    MissingField { index: usize, field: String },
    #[error("Invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },
    #[error("Database error: {0}")]
    Database(#[from] postgres::Error),
}

pub type LoaderResult<T> = Result<T, LoaderError>;
