use postgres::Transaction;

use crate::error::LoaderResult;
use crate::json_load::core_processor::CoreProcessor;
use crate::json_load::postgis_processor::PostgisProcessor;
use crate::json_load::table_builder::TableOutcome;

/// Strategy for tables without a geometry column
/// Nothing runs here; the builder still commits the drop and create afterwards
pub struct NonGeoStrategy;

impl PostgisProcessor for NonGeoStrategy {
    fn process_table_into_postgis(
        &self,
        core_processor: &CoreProcessor,
        _transaction: &mut Transaction<'_>,
    ) -> LoaderResult<TableOutcome> {
        tracing::info!(
            table = core_processor.table_name(),
            "No geometry columns found"
        );
        Ok(TableOutcome::NonSpatial {
            table: core_processor.table_name().to_string(),
        })
    }
}
