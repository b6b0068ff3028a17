//! Connection settings and the constants shared by the table builder and the loader.

use std::fmt;

use crate::error::{LoaderError, LoaderResult};

// Headers that mark a field as holding well-known-text geometry
pub const GEOMETRY_HEADERS: [&str; 3] = ["geom", "geometry", "wkt"];

/// Spatial reference every geometry column is declared with (Web Mercator)
pub const TARGET_SRID: u32 = 3857;

pub const SURROGATE_KEY_COLUMN: &str = "id BIGSERIAL PRIMARY KEY";

/// PostgreSQL truncates identifiers longer than NAMEDATALEN - 1 bytes
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

pub const DEFAULT_DATASET_PATH: &str = "assets/countries.json";
pub const DEFAULT_TABLE_NAME: &str = "GEO_TABLE";

/// Parameters needed to open a connection to PostgreSQL.
///
/// Built once at startup and handed to every operation that needs a
/// connection. Missing values are kept as empty strings so that the
/// failure shows up when the driver tries to connect.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub database: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: String,
}

impl ConnectionConfig {
    /// Read the connection settings from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    /// Variables already set in the environment take precedence over it.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded environment file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the settings from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();
        Self {
            database: get("DATABASE"),
            user: get("USER"),
            password: get("PASSWORD"),
            host: get("HOST"),
            port: get("PORT"),
        }
    }

    /// Translate into a driver config. Empty values stay unset.
    pub fn to_pg_config(&self) -> LoaderResult<postgres::Config> {
        let mut config = postgres::Config::new();
        if !self.database.is_empty() {
            config.dbname(&self.database);
        }
        if !self.user.is_empty() {
            config.user(&self.user);
        }
        if !self.password.is_empty() {
            config.password(&self.password);
        }
        if !self.host.is_empty() {
            config.host(&self.host);
        }
        if !self.port.is_empty() {
            let port = self.port.trim().parse::<u16>().map_err(|_| {
                LoaderError::Config(format!("PORT must be a number, got '{}'", self.port))
            })?;
            config.port(port);
        }
        Ok(config)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}
