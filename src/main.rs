use json_postgis::config::{DEFAULT_DATASET_PATH, DEFAULT_TABLE_NAME};
use json_postgis::{create_table_from_json, insert_data_from_json, ConnectionConfig, LoaderError};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), LoaderError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ConnectionConfig::from_env();
    tracing::info!(
        dataset = DEFAULT_DATASET_PATH,
        table = DEFAULT_TABLE_NAME,
        "Starting JSON to PostGIS load"
    );

    create_table_from_json(&config, DEFAULT_DATASET_PATH, DEFAULT_TABLE_NAME)?;
    insert_data_from_json(&config, DEFAULT_DATASET_PATH, DEFAULT_TABLE_NAME)?;
    Ok(())
}
