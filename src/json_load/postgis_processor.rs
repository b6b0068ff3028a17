use postgres::Transaction;

use crate::error::LoaderResult;
use crate::json_load::core_processor::CoreProcessor;
use crate::json_load::table_builder::TableOutcome;

/// Strategy trait for the work that follows table creation
/// Geometry tables get a spatial index, plain tables need nothing extra
pub trait PostgisProcessor {
    /// Runs inside the table builder's transaction, before the commit
    fn process_table_into_postgis(
        &self,
        core_processor: &CoreProcessor,
        transaction: &mut Transaction<'_>,
    ) -> LoaderResult<TableOutcome>;
}
