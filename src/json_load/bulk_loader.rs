use postgres::types::ToSql;
use std::path::Path;
use tracing::instrument;

use crate::config::{ConnectionConfig, TARGET_SRID};
use crate::error::{LoaderError, LoaderResult};
use crate::file_load::Record;
use crate::json_load::connection::connect_to_pg;
use crate::json_load::core_processor::CoreProcessor;
use crate::json_load::schema::is_geometry_header;
use crate::json_load::value_encoding::RecordValue;

/// Summary of a finished load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_inserted: u64,
}

/// Placeholder for the parameter at `position` (1-based).
/// Geometry headers take WKT text and convert it to a geometry in the target SRID.
pub fn placeholder_for(position: usize, header: &str) -> String {
    if is_geometry_header(header) {
        format!(
            "ST_Transform(ST_GeomFromText(${}, {srid}), {srid})",
            position,
            srid = TARGET_SRID
        )
    } else {
        format!("${}", position)
    }
}

pub fn insert_sql(table_name: &str, headers: &[String]) -> String {
    let placeholders: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| placeholder_for(index + 1, header))
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table_name,
        headers.join(", "),
        placeholders.join(", ")
    )
}

/// Values of `record` for exactly `headers`, in that order.
pub fn record_values<'a>(
    index: usize,
    record: &'a Record,
    headers: &[String],
) -> LoaderResult<Vec<RecordValue<'a>>> {
    headers
        .iter()
        .map(|header| {
            record
                .get(header)
                .map(RecordValue)
                .ok_or_else(|| LoaderError::MissingField {
                    index,
                    field: header.clone(),
                })
        })
        .collect()
}

/// Insert every record of the file into a table created by the table builder.
///
/// One insert runs per record, in file order, and all of them are committed
/// once at the end. The first failing record aborts the load and nothing is kept.
#[instrument(skip(config, json_file), fields(file = %json_file.as_ref().display()))]
pub fn insert_data_from_json(
    config: &ConnectionConfig,
    json_file: impl AsRef<Path>,
    table_name: &str,
) -> LoaderResult<LoadReport> {
    let processor = CoreProcessor::create_core_processor(json_file.as_ref(), table_name)?;
    let headers = processor.headers()?;
    let sql = insert_sql(processor.table_name(), &headers);
    tracing::debug!(sql = %sql, "Prepared insert");

    let mut client = connect_to_pg(config)?;
    let mut transaction = client.transaction()?;
    let statement = transaction.prepare(&sql)?;

    let mut rows_inserted = 0u64;
    for (index, record) in processor.records().iter().enumerate() {
        let values = record_values(index, record, &headers)?;
        let params: Vec<&(dyn ToSql + Sync)> = values
            .iter()
            .map(|value| value as &(dyn ToSql + Sync))
            .collect();
        rows_inserted += transaction.execute(&statement, &params)?;
    }
    transaction.commit()?;

    tracing::info!(table = table_name, rows_inserted, "Load committed");
    println!("Table {} was filled with data successfully ✅", table_name);
    Ok(LoadReport { rows_inserted })
}
