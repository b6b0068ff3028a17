use std::fmt;
use std::path::Path;
use tracing::instrument;

use crate::config::{ConnectionConfig, SURROGATE_KEY_COLUMN};
use crate::error::LoaderResult;
use crate::json_load::connection::connect_to_pg;
use crate::json_load::core_processor::CoreProcessor;
use crate::json_load::geo_strategy::GeoStrategy;
use crate::json_load::non_geo_strategy::NonGeoStrategy;
use crate::json_load::postgis_processor::PostgisProcessor;
use crate::json_load::schema::{spatial_column, FieldDescriptor};

/// How a table rebuild finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    Spatial {
        table: String,
        column: String,
        index_name: String,
    },
    NonSpatial {
        table: String,
    },
}

impl TableOutcome {
    pub fn is_spatial(&self) -> bool {
        matches!(self, TableOutcome::Spatial { .. })
    }

    /// Name of the spatial index as the server stores it.
    pub fn index_name(&self) -> Option<&str> {
        match self {
            TableOutcome::Spatial { index_name, .. } => Some(index_name),
            TableOutcome::NonSpatial { .. } => None,
        }
    }
}

impl fmt::Display for TableOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableOutcome::Spatial { table, .. } => {
                write!(
                    f,
                    "Table {} created successfully with spatial support ✅",
                    table
                )
            }
            TableOutcome::NonSpatial { table } => {
                write!(
                    f,
                    "Table {} created successfully without spatial support ✅",
                    table
                )
            }
        }
    }
}

/// The surrogate key followed by one definition per field, in field order.
pub fn column_definitions(fields: &[FieldDescriptor]) -> Vec<String> {
    std::iter::once(SURROGATE_KEY_COLUMN.to_string())
        .chain(fields.iter().map(FieldDescriptor::column_definition))
        .collect()
}

pub fn drop_table_sql(table_name: &str) -> String {
    format!("DROP TABLE IF EXISTS {};", table_name)
}

pub fn create_table_sql(table_name: &str, fields: &[FieldDescriptor]) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({});",
        table_name,
        column_definitions(fields).join(", ")
    )
}

// Unquoted identifiers are folded to lower case by the server, so report them that way
pub fn spatial_index_name(table_name: &str, column: &str) -> String {
    format!("idx_{}_{}", table_name, column).to_lowercase()
}

pub fn spatial_index_sql(table_name: &str, column: &str) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} USING GIST({});",
        spatial_index_name(table_name, column),
        table_name,
        column
    )
}

/// Everything the table builder will run, derived from the sample record.
#[derive(Debug, Clone)]
pub struct TablePlan {
    table_name: String,
    fields: Vec<FieldDescriptor>,
}

impl TablePlan {
    pub fn from_processor(core_processor: &CoreProcessor) -> LoaderResult<Self> {
        Ok(Self {
            table_name: core_processor.table_name().to_string(),
            fields: core_processor.fields()?,
        })
    }

    pub fn drop_sql(&self) -> String {
        drop_table_sql(&self.table_name)
    }

    pub fn create_sql(&self) -> String {
        create_table_sql(&self.table_name, &self.fields)
    }

    // Geometry tables get the index strategy, everything else the no-op one
    pub fn strategy(&self) -> Box<dyn PostgisProcessor> {
        match spatial_column(&self.fields) {
            Some(field) => Box::new(GeoStrategy::new(field.name.clone())),
            None => Box::new(NonGeoStrategy),
        }
    }
}

/// Drop and recreate `table_name` with a layout inferred from the first record of the file.
///
/// Any existing table with the same name is dropped together with its data.
/// The drop, the create and the optional spatial index are committed together.
#[instrument(skip(config, json_file), fields(file = %json_file.as_ref().display()))]
pub fn create_table_from_json(
    config: &ConnectionConfig,
    json_file: impl AsRef<Path>,
    table_name: &str,
) -> LoaderResult<TableOutcome> {
    let processor = CoreProcessor::create_core_processor(json_file.as_ref(), table_name)?;
    let plan = TablePlan::from_processor(&processor)?;

    let mut client = connect_to_pg(config)?;
    let mut transaction = client.transaction()?;

    let drop_sql = plan.drop_sql();
    tracing::debug!(sql = %drop_sql, "Executing");
    transaction.batch_execute(&drop_sql)?;

    let create_sql = plan.create_sql();
    tracing::debug!(sql = %create_sql, "Executing");
    transaction.batch_execute(&create_sql)?;

    let outcome = plan
        .strategy()
        .process_table_into_postgis(&processor, &mut transaction)?;
    transaction.commit()?;

    tracing::info!(
        spatial = outcome.is_spatial(),
        index = outcome.index_name(),
        "Table rebuilt"
    );
    println!("{}", outcome);
    Ok(outcome)
}
