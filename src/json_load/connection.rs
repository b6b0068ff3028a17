use postgres::{Client, NoTls};

use crate::config::ConnectionConfig;
use crate::error::{LoaderError, LoaderResult};

/// Open a new connection with the given settings. There is no pool and no retry.
pub fn connect_to_pg(config: &ConnectionConfig) -> LoaderResult<Client> {
    let pg_config = config.to_pg_config()?;
    tracing::debug!(
        host = %config.host,
        port = %config.port,
        database = %config.database,
        "Connecting to PostgreSQL"
    );
    pg_config.connect(NoTls).map_err(LoaderError::Connection)
}
