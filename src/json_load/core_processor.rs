use std::path::Path;

use crate::error::LoaderResult;
use crate::file_load::{first_record, read_dataset, Record};
use crate::json_load::schema::{infer_fields, validate_identifier, FieldDescriptor};

// Main processor struct shared by the table builder and the bulk loader
// Each operation builds its own processor, so the file is read once per operation
pub struct CoreProcessor {
    table_name: String,
    records: Vec<Record>,
}

impl CoreProcessor {
    // Read the dataset and check the table name before anything touches the database
    pub fn create_core_processor(
        file_path: impl AsRef<Path>,
        table_name: &str,
    ) -> LoaderResult<Self> {
        validate_identifier(table_name)?;
        let records = read_dataset(file_path)?;
        Ok(Self::from_records(table_name, records))
    }

    // Callers check the table name first
    pub(crate) fn from_records(table_name: &str, records: Vec<Record>) -> Self {
        Self {
            table_name: table_name.to_string(),
            records,
        }
    }

    // The first record is the reference for the column layout
    pub fn sample(&self) -> LoaderResult<&Record> {
        first_record(&self.records)
    }

    /// Field descriptors of the sample record, with every name checked as an identifier.
    pub fn fields(&self) -> LoaderResult<Vec<FieldDescriptor>> {
        let sample = self.sample()?;
        for header in sample.keys() {
            validate_identifier(header)?;
        }
        Ok(infer_fields(sample))
    }

    /// Column names of the sample record in key order.
    pub fn headers(&self) -> LoaderResult<Vec<String>> {
        Ok(self.fields()?.into_iter().map(|field| field.name).collect())
    }

    // Getter methods for attributes that need to be accessed by strategies and the loader
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}
