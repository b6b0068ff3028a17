use postgres::Transaction;

use crate::error::LoaderResult;
use crate::json_load::core_processor::CoreProcessor;
use crate::json_load::postgis_processor::PostgisProcessor;
use crate::json_load::table_builder::{spatial_index_name, spatial_index_sql, TableOutcome};

/// Strategy for tables with a geometry column
pub struct GeoStrategy {
    spatial_column: String,
}

impl GeoStrategy {
    pub fn new(spatial_column: impl Into<String>) -> Self {
        Self {
            spatial_column: spatial_column.into(),
        }
    }
}

impl PostgisProcessor for GeoStrategy {
    fn process_table_into_postgis(
        &self,
        core_processor: &CoreProcessor,
        transaction: &mut Transaction<'_>,
    ) -> LoaderResult<TableOutcome> {
        let table = core_processor.table_name();
        tracing::info!(table, column = %self.spatial_column, "Creating spatial index");

        let index_sql = spatial_index_sql(table, &self.spatial_column);
        tracing::debug!(sql = %index_sql, "Executing");
        transaction.batch_execute(&index_sql)?;

        Ok(TableOutcome::Spatial {
            table: table.to_string(),
            column: self.spatial_column.clone(),
            index_name: spatial_index_name(table, &self.spatial_column),
        })
    }
}
