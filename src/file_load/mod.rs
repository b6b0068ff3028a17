use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::error::{LoaderError, LoaderResult};

/// One flat JSON object from the dataset. Keys keep their file order.
pub type Record = Map<String, Value>;

// Read the whole dataset and check that it is an array of objects
pub fn read_dataset(path: impl AsRef<Path>) -> LoaderResult<Vec<Record>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_json::from_str(&content).map_err(|source| LoaderError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_records(value)?;
    tracing::debug!(path = %path.display(), records = records.len(), "Dataset loaded");
    Ok(records)
}

pub fn parse_records(value: Value) -> LoaderResult<Vec<Record>> {
    let Value::Array(items) = value else {
        return Err(LoaderError::NotAnArray);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(LoaderError::InvalidRecord { index }),
        })
        .collect()
}

// The first record is the schema sample for the whole file
pub fn first_record(records: &[Record]) -> LoaderResult<&Record> {
    records.first().ok_or(LoaderError::EmptyDataset)
}
